//! # Database Handle
//!
//! Opens the SQLite file that backs the key-value store.
//!
//! ```text
//! DbConfig::new(path) ──► Database::new(config).await
//!                              │  open (create if missing), WAL, migrate
//!                              ▼
//!                         db.kv_store() ──► SqliteKvStore
//!                              │
//!                         db.close().await on shutdown
//! ```
//!
//! Each collection is one row that is rewritten whole, so the pool stays
//! small. WAL keeps the previous document readable until a rewrite commits.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::kv::SqliteKvStore;
use crate::migrations;

const IN_MEMORY: &str = ":memory:";

/// Where the database lives and how many connections may touch it.
#[derive(Debug, Clone, PartialEq)]
pub struct DbConfig {
    pub database_path: PathBuf,

    /// 1 for in-memory databases: every connection would get its own.
    pub max_connections: u32,

    /// How long a writer waits on a locked file before failing the save.
    pub busy_timeout: Duration,
}

impl DbConfig {
    /// File-backed database; the file is created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 4,
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// Private in-memory database, gone when the handle is dropped.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1,
            busy_timeout: Duration::from_secs(5),
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::new().in_memory(true)
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        };

        options
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(self.busy_timeout)
    }
}

/// Open database with the schema migrated.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening database");

        let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
        if config.is_in_memory() {
            // The data lives only as long as its one connection.
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        migrations::run_migrations(&pool).await?;

        Ok(Database { pool })
    }

    /// Key-value store sharing this handle's pool.
    pub fn kv_store(&self) -> SqliteKvStore {
        SqliteKvStore::new(self.pool.clone())
    }

    /// Closes the pool. Stores obtained from [`Database::kv_store`] fail
    /// every call afterwards.
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
