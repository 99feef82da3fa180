//! # Collection Documents
//!
//! Maps the four in-memory collections onto key-value documents.
//!
//! ## Load / Save
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  startup                                                                │
//! │    load_all ──► "<prefix>products"  ──► decode_products (legacy-aware)  │
//! │             ──► "<prefix>customers" ──► decode_customers                │
//! │             ──► "<prefix>sales"     ──► decode_sales                    │
//! │             ──► "<prefix>purchases" ──► decode_purchases                │
//! │                 missing / unreadable / corrupt ──► empty + warn!        │
//! │                                                                         │
//! │  after every mutation                                                   │
//! │    save(store, Collection) ──► encode_document ──► kv.save              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Loading never fails: a bad document costs that one collection, never the
//! startup.

use chrono::{DateTime, Utc};
use tally_core::migrate::{self, MigrateError};
use tally_core::{Collection, Store, TierDefaults};
use tracing::{debug, info, warn};

use crate::error::DbResult;
use crate::kv::KeyValueStore;

/// Default key prefix.
pub const DEFAULT_KEY_PREFIX: &str = "tally_";

/// A collection that could not be read and was started empty.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadWarning {
    pub collection: Collection,
    pub message: String,
}

/// Result of [`Collections::load_all`].
#[derive(Debug, Clone)]
pub struct LoadedStore {
    pub store: Store,
    pub warnings: Vec<LoadWarning>,
}

/// Key layout for the collection documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    key_prefix: String,
}

impl Default for Collections {
    fn default() -> Self {
        Collections::new(DEFAULT_KEY_PREFIX)
    }
}

impl Collections {
    pub fn new(key_prefix: impl Into<String>) -> Self {
        Collections {
            key_prefix: key_prefix.into(),
        }
    }

    /// Storage key of `collection`, e.g. `tally_products`.
    pub fn key(&self, collection: Collection) -> String {
        format!("{}{}", self.key_prefix, collection.name())
    }

    /// Loads all four collections into a [`Store`].
    pub async fn load_all<K>(
        &self,
        kv: &K,
        defaults: &TierDefaults,
        now: DateTime<Utc>,
    ) -> LoadedStore
    where
        K: KeyValueStore + ?Sized,
    {
        let mut warnings = Vec::new();

        let products = self
            .load_one(kv, Collection::Products, &mut warnings, |raw| {
                migrate::decode_products(raw, defaults, now)
            })
            .await;
        let customers = self
            .load_one(kv, Collection::Customers, &mut warnings, |raw| {
                migrate::decode_customers(raw, now)
            })
            .await;
        let sales = self
            .load_one(kv, Collection::Sales, &mut warnings, |raw| {
                migrate::decode_sales(raw, now)
            })
            .await;
        let purchases = self
            .load_one(kv, Collection::Purchases, &mut warnings, |raw| {
                migrate::decode_purchases(raw, now)
            })
            .await;

        info!(
            products = products.len(),
            customers = customers.len(),
            sales = sales.len(),
            purchases = purchases.len(),
            "Loaded collections"
        );

        LoadedStore {
            store: Store::from_parts(defaults.clone(), products, customers, sales, purchases),
            warnings,
        }
    }

    async fn load_one<K, T>(
        &self,
        kv: &K,
        collection: Collection,
        warnings: &mut Vec<LoadWarning>,
        decode: impl FnOnce(&str) -> Result<Vec<T>, MigrateError>,
    ) -> Vec<T>
    where
        K: KeyValueStore + ?Sized,
    {
        let key = self.key(collection);

        let raw = match kv.load(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %key, "No stored document, starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Could not read document, starting empty");
                warnings.push(LoadWarning {
                    collection,
                    message: e.to_string(),
                });
                return Vec::new();
            }
        };

        match decode(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(key = %key, error = %e, "Corrupt document, starting empty");
                warnings.push(LoadWarning {
                    collection,
                    message: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    /// Writes one collection of `store` as a current-version document.
    pub async fn save<K>(&self, kv: &K, store: &Store, collection: Collection) -> DbResult<()>
    where
        K: KeyValueStore + ?Sized,
    {
        let document = match collection {
            Collection::Products => migrate::encode_document(store.products()),
            Collection::Customers => migrate::encode_document(store.customers()),
            Collection::Sales => migrate::encode_document(store.sales()),
            Collection::Purchases => migrate::encode_document(store.purchases()),
        }?;

        let key = self.key(collection);
        kv.save(&key, &document).await.map_err(|e| {
            warn!(key = %key, error = %e, "Failed to save document");
            e
        })
    }

    /// Writes every collection. Stops at the first failure.
    pub async fn save_all<K>(&self, kv: &K, store: &Store) -> DbResult<()>
    where
        K: KeyValueStore + ?Sized,
    {
        for collection in Collection::ALL {
            self.save(kv, store, collection).await?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use crate::pool::{Database, DbConfig};
    use tally_core::purchase::record_purchase;
    use tally_core::validation::PurchaseInput;
    use tally_core::Tier;

    #[tokio::test]
    async fn test_empty_storage_loads_empty_store() {
        let kv = MemoryKvStore::new();
        let loaded = Collections::default()
            .load_all(&kv, &TierDefaults::default(), Utc::now())
            .await;

        assert!(loaded.store.products().is_empty());
        assert!(loaded.store.sales().is_empty());
        assert!(loaded.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_document_yields_empty_collection() {
        let kv = MemoryKvStore::new();
        let collections = Collections::default();
        kv.save(&collections.key(Collection::Sales), "{oops")
            .await
            .unwrap();
        kv.save(
            &collections.key(Collection::Customers),
            r#"[{"id": "c1", "name": "Emily Davis"}]"#,
        )
        .await
        .unwrap();

        let loaded = collections
            .load_all(&kv, &TierDefaults::default(), Utc::now())
            .await;

        assert!(loaded.store.sales().is_empty());
        assert_eq!(loaded.store.customers().len(), 1);
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(loaded.warnings[0].collection, Collection::Sales);
    }

    #[tokio::test]
    async fn test_legacy_products_are_migrated_on_load() {
        let kv = MemoryKvStore::new();
        kv.save(
            "tally_products",
            r#"[{"id": "p1", "name": "Formula 1", "category": "Nutrition",
                 "mrp": 50, "price": 45.95, "cost": 25, "stock": 10, "minStock": 5}]"#,
        )
        .await
        .unwrap();

        let loaded = Collections::default()
            .load_all(&kv, &TierDefaults::default(), Utc::now())
            .await;
        let product = &loaded.store.products()[0];

        assert_eq!(product.reference_price.cents(), 5000);
        assert_eq!(product.tiers.get(Tier::T42).cents(), 2900);
    }

    #[tokio::test]
    async fn test_save_and_reload_through_sqlite() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let kv = db.kv_store();
        let collections = Collections::new("test_");
        let defaults = TierDefaults::default();

        let mut store = Store::new(defaults.clone());
        store.seed_sample_data(Utc::now());
        let input = PurchaseInput {
            product_name: "Formula 1".to_string(),
            quantity: "5".to_string(),
            cost: "20".to_string(),
            supplier: "Acme".to_string(),
        };
        record_purchase(&mut store, &input, Utc::now()).unwrap();

        collections.save_all(&kv, &store).await.unwrap();
        assert_eq!(
            kv.keys().await.unwrap(),
            vec![
                "test_customers".to_string(),
                "test_products".to_string(),
                "test_purchases".to_string(),
                "test_sales".to_string(),
            ]
        );

        let loaded = collections.load_all(&kv, &defaults, Utc::now()).await;
        assert_eq!(loaded.store, store);
        assert!(loaded.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_save_failure_is_reported() {
        let kv = MemoryKvStore::new();
        kv.set_fail_on_save(true).await;

        let store = Store::default();
        let result = Collections::default()
            .save(&kv, &store, Collection::Products)
            .await;

        assert!(result.is_err());
        assert!(kv.is_empty().await);
    }
}
