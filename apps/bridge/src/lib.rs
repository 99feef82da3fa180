//! # Tally Bridge Library
//!
//! The process the frontend talks to. It owns the session state and answers
//! JSON-lines requests on stdin/stdout.
//!
//! ## Module Organization
//! ```text
//! tally_bridge/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── ipc.rs          ◄─── Request/Response lines, serve loop
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState, Notice, persistence write-through
//! │   └── config.rs   ◄─── BridgeConfig (TALLY_* environment)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Dispatch table
//! │   ├── product.rs  ◄─── Product listing, search, CRUD
//! │   ├── customer.rs ◄─── Customer CRUD
//! │   ├── sale.rs     ◄─── Sale draft and completion
//! │   ├── purchase.rs ◄─── Supplier purchases
//! │   ├── report.rs   ◄─── Dashboard and reports
//! │   ├── document.rs ◄─── Invoices and bill links
//! │   └── config.rs   ◄─── Configuration, clear-all
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Output Streams
//! stdout carries nothing but responses. All logging goes to stderr.

pub mod commands;
pub mod error;
pub mod ipc;
pub mod state;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use error::BridgeError;
use state::{AppState, BridgeConfig};
use tally_db::{Database, DbConfig, KeyValueStore};

/// Runs the bridge until stdin closes.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Bridge Startup                                    │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber to stderr, RUST_LOG or the default filter      │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • TALLY_* environment variables over defaults                       │
/// │                                                                         │
/// │  3. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode, pending migrations applied                  │
/// │                                                                         │
/// │  4. Load State ───────────────────────────────────────────────────────► │
/// │     • Every collection read (corrupt ones reset, with a notice)         │
/// │     • Sample catalog seeded into an empty store                         │
/// │                                                                         │
/// │  5. Serve ────────────────────────────────────────────────────────────► │
/// │     • One request per stdin line, one response per stdout line          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), BridgeError> {
    init_tracing();

    info!("Starting Tally POS bridge");

    let config = BridgeConfig::from_env()?;
    let db_path = config.database_path()?;
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;
    info!("Database connected and migrations applied");

    let kv: Arc<dyn KeyValueStore> = Arc::new(db.kv_store());
    let app = AppState::open(config, kv).await;
    info!(
        products = app.store.products().len(),
        customers = app.store.customers().len(),
        "State initialized"
    );

    let state = Arc::new(Mutex::new(app));
    ipc::serve(state, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;

    db.close().await;
    info!("Bridge stopped");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tally=trace` - Show trace for tally crates only
/// - Default: `info,tally=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
