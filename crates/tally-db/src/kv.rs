//! # Key-Value Store
//!
//! The persistence collaborator: string keys to string values, nothing more.
//! What the values mean is decided by [`Collections`](crate::Collections).
//!
//! ```text
//! ┌──────────────────────┐      ┌──────────────────────────────────────┐
//! │  dyn KeyValueStore   │ ───► │ SqliteKvStore  (kv_entries table)    │
//! │  load / save / remove│ ───► │ MemoryKvStore  (tests, failure mode) │
//! └──────────────────────┘      └──────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Async key-value persistence.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` when the key was never written.
    async fn load(&self, key: &str) -> DbResult<Option<String>>;

    /// Inserts or replaces the value of `key`.
    async fn save(&self, key: &str, value: &str) -> DbResult<()>;

    /// Deletes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> DbResult<()>;
}

// =============================================================================
// SQLite
// =============================================================================

/// [`KeyValueStore`] over the `kv_entries` table.
#[derive(Debug, Clone)]
pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteKvStore { pool }
    }

    /// Every stored key, sorted. Diagnostics only.
    pub async fn keys(&self) -> DbResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM kv_entries ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn load(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        debug!(key, found = value.is_some(), "Loaded document");
        Ok(value)
    }

    async fn save(&self, key: &str, value: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(key, bytes = value.len(), "Saved document");
        Ok(())
    }

    async fn remove(&self, key: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// [`KeyValueStore`] held in a map. Can be told to fail every write.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
    fail_on_save: RwLock<bool>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `save` and `remove` fail (or succeed again).
    pub async fn set_fail_on_save(&self, fail: bool) {
        *self.fail_on_save.write().await = fail;
    }

    /// Raw value of `key`, bypassing the failure switch.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn check_writable(&self) -> DbResult<()> {
        if *self.fail_on_save.read().await {
            return Err(DbError::Unavailable("Memory store is read-only".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn load(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.get(key).await)
    }

    async fn save(&self, key: &str, value: &str) -> DbResult<()> {
        self.check_writable().await?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> DbResult<()> {
        self.check_writable().await?;
        self.entries.write().await.remove(key);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_sqlite_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let kv = db.kv_store();

        assert_eq!(kv.load("tally_products").await.unwrap(), None);

        kv.save("tally_products", "[1]").await.unwrap();
        kv.save("tally_products", "[1,2]").await.unwrap();
        assert_eq!(
            kv.load("tally_products").await.unwrap().as_deref(),
            Some("[1,2]")
        );
        assert_eq!(kv.keys().await.unwrap(), vec!["tally_products".to_string()]);

        kv.remove("tally_products").await.unwrap();
        kv.remove("tally_products").await.unwrap();
        assert_eq!(kv.load("tally_products").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_failure_mode() {
        let kv = MemoryKvStore::new();
        kv.save("a", "1").await.unwrap();

        kv.set_fail_on_save(true).await;
        assert!(matches!(
            kv.save("a", "2").await,
            Err(DbError::Unavailable(_))
        ));
        assert!(kv.remove("a").await.is_err());
        assert_eq!(kv.load("a").await.unwrap().as_deref(), Some("1"));

        kv.set_fail_on_save(false).await;
        kv.save("a", "2").await.unwrap();
        assert_eq!(kv.get("a").await.as_deref(), Some("2"));
        assert_eq!(kv.len().await, 1);
    }

    #[tokio::test]
    async fn test_usable_as_trait_object() {
        let kv: Box<dyn KeyValueStore> = Box::new(MemoryKvStore::new());
        kv.save("k", "v").await.unwrap();
        assert_eq!(kv.load("k").await.unwrap().as_deref(), Some("v"));
    }
}
