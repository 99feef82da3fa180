//! # Store
//!
//! Exclusive owner of the four in-memory collections.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              Store                                      │
//! │                                                                         │
//! │   products ◄── add/update/delete_product, commit_decrement              │
//! │   customers ◄─ add/update/delete_customer                               │
//! │   sales ◄───── SaleBuilder::commit (append only)                        │
//! │   purchases ◄─ record_purchase (append only)                            │
//! │                                                                         │
//! │   Persistence is a mirror: the caller flushes the touched               │
//! │   Collection after every mutation.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Edits and deletes of an id that no longer exists return `None`/`false`
//! and change nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pricing::TierDefaults;
use crate::sample;
use crate::types::{new_id, Customer, Product, Purchase, Sale};
use crate::validation::{CustomerDraft, ProductDraft};

// =============================================================================
// Collection
// =============================================================================

/// One persisted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Products,
    Customers,
    Sales,
    Purchases,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Products,
        Collection::Customers,
        Collection::Sales,
        Collection::Purchases,
    ];

    /// Storage key suffix for this collection.
    pub const fn name(&self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Customers => "customers",
            Collection::Sales => "sales",
            Collection::Purchases => "purchases",
        }
    }
}

// =============================================================================
// Store
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    products: Vec<Product>,
    customers: Vec<Customer>,
    sales: Vec<Sale>,
    purchases: Vec<Purchase>,
    tier_defaults: TierDefaults,
}

impl Store {
    /// Creates an empty store that backfills tiers with `tier_defaults`.
    pub fn new(tier_defaults: TierDefaults) -> Self {
        Store {
            tier_defaults,
            ..Default::default()
        }
    }

    /// Rebuilds a store from loaded documents.
    pub fn from_parts(
        tier_defaults: TierDefaults,
        products: Vec<Product>,
        customers: Vec<Customer>,
        sales: Vec<Sale>,
        purchases: Vec<Purchase>,
    ) -> Self {
        Store {
            products,
            customers,
            sales,
            purchases,
            tier_defaults,
        }
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    pub fn purchases(&self) -> &[Purchase] {
        &self.purchases
    }

    pub fn tier_defaults(&self) -> &TierDefaults {
        &self.tier_defaults
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    pub fn sale(&self, id: &str) -> Option<&Sale> {
        self.sales.iter().find(|s| s.id == id)
    }

    pub fn purchase(&self, id: &str) -> Option<&Purchase> {
        self.purchases.iter().find(|p| p.id == id)
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Adds a product from a validated form.
    pub fn add_product(&mut self, draft: ProductDraft, now: DateTime<Utc>) -> Product {
        let product = Product {
            id: new_id(),
            name: draft.name,
            category: draft.category,
            description: draft.description,
            reference_price: draft.reference_price,
            stock: draft.stock,
            min_stock: draft.min_stock,
            volume_points: draft.volume_points,
            tiers: draft.tiers,
            created_at: now,
            updated_at: now,
        };
        self.products.push(product.clone());
        product
    }

    /// Replaces every form field of an existing product.
    ///
    /// `id` and `created_at` are kept; the tier table is replaced whole.
    pub fn update_product(
        &mut self,
        id: &str,
        draft: ProductDraft,
        now: DateTime<Utc>,
    ) -> Option<Product> {
        let product = self.products.iter_mut().find(|p| p.id == id)?;

        product.name = draft.name;
        product.category = draft.category;
        product.description = draft.description;
        product.reference_price = draft.reference_price;
        product.stock = draft.stock;
        product.min_stock = draft.min_stock;
        product.volume_points = draft.volume_points;
        product.tiers = draft.tiers;
        product.updated_at = now;

        Some(product.clone())
    }

    /// Hard delete. Past sales keep their snapshots.
    pub fn delete_product(&mut self, id: &str) -> bool {
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        self.products.len() != before
    }

    // -------------------------------------------------------------------------
    // Customers
    // -------------------------------------------------------------------------

    pub fn add_customer(&mut self, draft: CustomerDraft, now: DateTime<Utc>) -> Customer {
        let customer = Customer {
            id: new_id(),
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            address: draft.address,
            discount_percent: draft.discount_percent,
            created_at: now,
            updated_at: now,
        };
        self.customers.push(customer.clone());
        customer
    }

    pub fn update_customer(
        &mut self,
        id: &str,
        draft: CustomerDraft,
        now: DateTime<Utc>,
    ) -> Option<Customer> {
        let customer = self.customers.iter_mut().find(|c| c.id == id)?;

        customer.name = draft.name;
        customer.email = draft.email;
        customer.phone = draft.phone;
        customer.address = draft.address;
        customer.discount_percent = draft.discount_percent;
        customer.updated_at = now;

        Some(customer.clone())
    }

    /// Hard delete. Sales keep the customer name they were committed with.
    pub fn delete_customer(&mut self, id: &str) -> bool {
        let before = self.customers.len();
        self.customers.retain(|c| c.id != id);
        self.customers.len() != before
    }

    // -------------------------------------------------------------------------
    // Bulk
    // -------------------------------------------------------------------------

    /// Empties all four collections.
    pub fn clear_all(&mut self) {
        self.products.clear();
        self.customers.clear();
        self.sales.clear();
        self.purchases.clear();
    }

    /// Fills empty product and customer collections with sample records.
    ///
    /// ## Returns
    /// The collections that were seeded (and therefore need flushing).
    pub fn seed_sample_data(&mut self, now: DateTime<Utc>) -> Vec<Collection> {
        let mut seeded = Vec::new();

        if self.products.is_empty() {
            self.products = sample::sample_products(&self.tier_defaults, now);
            seeded.push(Collection::Products);
        }
        if self.customers.is_empty() {
            self.customers = sample::sample_customers(now);
            seeded.push(Collection::Customers);
        }

        seeded
    }

    // -------------------------------------------------------------------------
    // Ledger internals
    // -------------------------------------------------------------------------

    pub(crate) fn products_mut(&mut self) -> &mut [Product] {
        &mut self.products
    }

    pub(crate) fn push_sale(&mut self, sale: Sale) {
        self.sales.push(sale);
    }

    pub(crate) fn push_purchase(&mut self, purchase: Purchase) {
        self.purchases.push(purchase);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::Tier;
    use crate::validation::{CustomerInput, ProductInput};
    use std::collections::BTreeMap;

    fn draft(name: &str, price: &str) -> ProductDraft {
        ProductInput {
            name: name.to_string(),
            category: "Nutrition".to_string(),
            reference_price: price.to_string(),
            stock: "10".to_string(),
            min_stock: "5".to_string(),
            tiers: BTreeMap::new(),
            ..Default::default()
        }
        .validate(&TierDefaults::default())
        .unwrap()
    }

    #[test]
    fn test_add_and_update_product() {
        let mut store = Store::default();
        let created = Utc::now();
        let product = store.add_product(draft("Formula 1", "50"), created);
        assert_eq!(store.products().len(), 1);
        assert_eq!(product.tiers.get(Tier::T42), Money::from_cents(2900));

        let later = created + chrono::Duration::minutes(5);
        let updated = store
            .update_product(&product.id, draft("Formula 1 Vanilla", "60"), later)
            .unwrap();

        assert_eq!(updated.id, product.id);
        assert_eq!(updated.created_at, created);
        assert_eq!(updated.updated_at, later);
        assert_eq!(updated.name, "Formula 1 Vanilla");
        assert_eq!(updated.tiers.get(Tier::T50), Money::from_cents(3000));
    }

    #[test]
    fn test_stale_ids_are_noops() {
        let mut store = Store::default();
        store.add_product(draft("Formula 1", "50"), Utc::now());
        let snapshot = store.clone();

        assert!(store
            .update_product("missing", draft("X", "1"), Utc::now())
            .is_none());
        assert!(!store.delete_product("missing"));
        assert!(!store.delete_customer("missing"));
        assert_eq!(store, snapshot);
    }

    #[test]
    fn test_customer_lifecycle() {
        let mut store = Store::default();
        let form = CustomerInput {
            name: "Sarah Johnson".to_string(),
            ..Default::default()
        };
        let customer = store.add_customer(form.validate().unwrap(), Utc::now());

        let renamed = CustomerInput {
            name: "Sarah J.".to_string(),
            ..Default::default()
        };
        let updated = store
            .update_customer(&customer.id, renamed.validate().unwrap(), Utc::now())
            .unwrap();
        assert_eq!(updated.name, "Sarah J.");

        assert!(store.delete_customer(&customer.id));
        assert!(store.customers().is_empty());
    }

    #[test]
    fn test_seed_only_fills_empty_collections() {
        let mut store = Store::default();
        store.add_product(draft("Own product", "10"), Utc::now());

        let seeded = store.seed_sample_data(Utc::now());
        assert_eq!(seeded, vec![Collection::Customers]);
        assert_eq!(store.products().len(), 1);
        assert_eq!(store.customers().len(), 3);

        assert!(store.seed_sample_data(Utc::now()).is_empty());
    }

    #[test]
    fn test_clear_all() {
        let mut store = Store::default();
        store.seed_sample_data(Utc::now());
        store.clear_all();
        assert!(store.products().is_empty());
        assert!(store.customers().is_empty());
        assert!(store.sales().is_empty());
        assert!(store.purchases().is_empty());
    }

    #[test]
    fn test_collection_names() {
        let names: Vec<_> = Collection::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["products", "customers", "sales", "purchases"]);
    }
}
