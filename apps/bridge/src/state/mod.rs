//! # State Module
//!
//! The session state of the bridge: one [`AppState`] behind a mutex.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  SharedState = Arc<Mutex<AppState>>   (locked for a whole request)      │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │    Store     │  │ SaleBuilder  │  │ KV store +   │  │ Bridge     │  │
//! │  │              │  │              │  │ Collections  │  │ Config     │  │
//! │  │  products    │  │  draft lines │  │              │  │            │  │
//! │  │  customers   │  │  customer    │  │  persist()   │  │ store name │  │
//! │  │  sales       │  │  totals      │  │  after each  │  │ currency   │  │
//! │  │  purchases   │  │              │  │  mutation    │  │ tiers      │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘  │
//! │                                                                         │
//! │  Save failures never undo the in-memory change: they become Notices    │
//! │  attached to the next response.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;

pub use config::BridgeConfig;

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tally_core::{Collection, SaleBuilder, Store};
use tally_db::{Collections, DbResult, KeyValueStore};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// State shared by the IPC loop.
pub type SharedState = Arc<Mutex<AppState>>;

// =============================================================================
// Notices
// =============================================================================

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// A non-blocking message shown alongside a successful response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

// =============================================================================
// App State
// =============================================================================

/// Everything one bridge session owns.
pub struct AppState {
    /// The four collections.
    pub store: Store,

    /// The sale being built on the sale form.
    pub sale: SaleBuilder,

    pub config: BridgeConfig,

    kv: Arc<dyn KeyValueStore>,
    collections: Collections,
    notices: Vec<Notice>,
}

impl AppState {
    /// Loads the collections from `kv` and prepares an empty sale draft.
    ///
    /// ## Startup Sequence
    /// 1. Load every collection (corrupt ones start empty, with a notice)
    /// 2. Seed the sample catalog when enabled and the store is empty
    /// 3. Start a blank draft preselecting the configured tier
    pub async fn open(config: BridgeConfig, kv: Arc<dyn KeyValueStore>) -> Self {
        let collections = Collections::new(config.key_prefix.clone());
        let loaded = collections
            .load_all(kv.as_ref(), &config.tier_defaults, Utc::now())
            .await;

        let notices = loaded
            .warnings
            .iter()
            .map(|w| {
                Notice::warning(format!(
                    "Stored {} could not be read and were reset: {}",
                    w.collection.name(),
                    w.message
                ))
            })
            .collect();

        let mut state = AppState {
            store: loaded.store,
            sale: SaleBuilder::new().with_default_tier(config.default_tier),
            config,
            kv,
            collections,
            notices,
        };

        if state.config.seed_sample_data {
            let seeded = state.store.seed_sample_data(Utc::now());
            if !seeded.is_empty() {
                info!(collections = ?seeded, "Seeded sample data");
                state.persist(&seeded).await;
            }
        }

        state
    }

    /// Writes `collections` through to storage.
    ///
    /// Failures are logged and queued as warnings; the in-memory state is
    /// kept either way.
    pub async fn persist(&mut self, collections: &[Collection]) {
        for &collection in collections {
            if let Err(e) = self
                .collections
                .save(self.kv.as_ref(), &self.store, collection)
                .await
            {
                warn!(collection = collection.name(), error = %e, "Change kept in memory only");
                self.notices.push(Notice::warning(format!(
                    "Saved in this session only; {} could not be written: {}",
                    collection.name(),
                    e
                )));
            }
        }
    }

    /// Queues a notice for the next response.
    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Drains queued notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Deletes every stored document, then empties the store and the draft.
    ///
    /// Storage goes first: if it fails the session keeps its data.
    pub async fn clear_all(&mut self) -> DbResult<()> {
        for collection in Collection::ALL {
            self.kv.remove(&self.collections.key(collection)).await?;
        }

        self.store.clear_all();
        self.sale.reset();
        info!("All data cleared");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tally_db::MemoryKvStore;

    fn config(seed: bool) -> BridgeConfig {
        BridgeConfig {
            seed_sample_data: seed,
            ..BridgeConfig::default()
        }
    }

    #[tokio::test]
    async fn test_open_seeds_and_persists_sample_data() {
        let kv = Arc::new(MemoryKvStore::new());
        let state = AppState::open(config(true), kv.clone()).await;

        assert_eq!(state.store.products().len(), 5);
        assert_eq!(state.store.customers().len(), 3);
        assert!(kv.get("tally_products").await.is_some());
        assert!(kv.get("tally_customers").await.is_some());
    }

    #[tokio::test]
    async fn test_open_without_seeding_starts_empty() {
        let kv = Arc::new(MemoryKvStore::new());
        let state = AppState::open(config(false), kv.clone()).await;

        assert!(state.store.products().is_empty());
        assert!(kv.is_empty().await);
    }

    #[tokio::test]
    async fn test_corrupt_document_becomes_notice() {
        let kv = Arc::new(MemoryKvStore::new());
        kv.save("tally_sales", "not json").await.unwrap();

        let mut state = AppState::open(config(false), kv).await;
        let notices = state.take_notices();

        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Warning);
        assert!(notices[0].message.contains("sales"));
        assert!(state.take_notices().is_empty());
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_memory_and_warns() {
        let kv = Arc::new(MemoryKvStore::new());
        let mut state = AppState::open(config(true), kv.clone()).await;
        kv.set_fail_on_save(true).await;

        let id = state.store.products()[0].id.clone();
        assert!(state.store.delete_product(&id));
        state.persist(&[Collection::Products]).await;

        assert_eq!(state.store.products().len(), 4);
        let notices = state.take_notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.contains("products"));
    }

    #[tokio::test]
    async fn test_clear_all() {
        let kv = Arc::new(MemoryKvStore::new());
        let mut state = AppState::open(config(true), kv.clone()).await;

        kv.set_fail_on_save(true).await;
        assert!(state.clear_all().await.is_err());
        assert_eq!(state.store.products().len(), 5);

        kv.set_fail_on_save(false).await;
        state.clear_all().await.unwrap();
        assert!(state.store.products().is_empty());
        assert!(kv.is_empty().await);
    }
}
