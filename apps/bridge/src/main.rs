//! # Tally Bridge Entry Point
//!
//! Spawned by the frontend shell; speaks JSON lines on stdin/stdout.
//!
//! ## Process Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS                                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Frontend                                    │  │
//! │  │  • Product catalog      • Sale form                              │  │
//! │  │  • Purchases            • Dashboard and reports                  │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │                     one JSON line per request                          │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    tally-bridge (this crate)                     │  │
//! │  │                                                                  │  │
//! │  │  main.rs ────► Tokio runtime, exit status                        │  │
//! │  │  lib.rs ─────► Logging, config, database, state                  │  │
//! │  │  ipc.rs ─────► Request/response loop                             │  │
//! │  │  commands/ ──► save_product, set_line_quantity, complete_sale    │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                         SQLite Database                          │  │
//! │  │  tally.db: kv_entries (one JSON document per collection)         │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match tally_bridge::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Bridge failed");
            eprintln!("tally-bridge: {e}");
            ExitCode::FAILURE
        }
    }
}
