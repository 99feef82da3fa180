//! # tally-db: Persistence Layer for Tally POS
//!
//! Mirrors the core's in-memory collections into a key-value store, one
//! JSON document per collection. SQLite (via sqlx) in production, an
//! in-memory map in tests.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Data Flow                              │
//! │                                                                         │
//! │  Bridge command (save_product, complete_sale, ...)                      │
//! │       │  mutates tally_core::Store in memory                            │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Collections  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ load_all/save │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ KeyValueStore │    │ 001_kv_store │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   SQLite: kv_entries(key, value, updated_at)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Opening the SQLite database
//! - [`migrations`] - Embedded database migrations
//! - [`kv`] - The key-value trait and its SQLite / in-memory stores
//! - [`collections`] - Collection documents on top of a key-value store
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_db::{Collections, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/tally.db")).await?;
//! let kv = db.kv_store();
//!
//! let collections = Collections::new("tally_");
//! let loaded = collections.load_all(&kv, &TierDefaults::default(), Utc::now()).await;
//! let mut store = loaded.store;
//!
//! // ... mutate the store ...
//! collections.save(&kv, &store, Collection::Products).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod collections;
pub mod error;
pub mod kv;
pub mod migrations;
pub mod pool;

// =============================================================================
// Re-exports
// =============================================================================

pub use collections::{Collections, LoadWarning, LoadedStore, DEFAULT_KEY_PREFIX};
pub use error::{DbError, DbResult};
pub use kv::{KeyValueStore, MemoryKvStore, SqliteKvStore};
pub use pool::{Database, DbConfig};
