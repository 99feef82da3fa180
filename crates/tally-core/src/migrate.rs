//! # Stored Documents and Legacy Migration
//!
//! Each collection is persisted as one JSON document.
//!
//! ## Document Versions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  v1 (legacy)   [ {...}, {...} ]                                         │
//! │                bare array, money as decimal floats, products with       │
//! │                price / cost / mrp? / priceTiers? / prices?              │
//! │                        │                                                │
//! │                        ▼  upgrade once, at load                         │
//! │  v2 (current)  { "version": 2, "records": [ {...} ] }                   │
//! │                money in minor units, complete tier tables               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A v1 array may mix legacy and current records; each record is tried as
//! the current shape first. Every product that comes out of here has a
//! complete, backfilled tier table, so nothing downstream needs to check
//! which fields a record happened to carry.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::money::Money;
use crate::pricing::TierDefaults;
use crate::types::{new_id, Customer, Product, Purchase, Sale, SaleLine};

/// Version written by [`encode_document`].
pub const DOCUMENT_VERSION: u32 = 2;

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("Malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unsupported document version {0}")]
    UnsupportedVersion(u32),

    #[error("Document is neither an array nor a versioned object")]
    UnknownLayout,
}

// =============================================================================
// Envelope
// =============================================================================

#[derive(Serialize)]
struct DocumentRef<'a, T> {
    version: u32,
    records: &'a [T],
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    records: Value,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Stored<C, L> {
    Current(C),
    Legacy(L),
}

/// Serializes records as a current-version document.
pub fn encode_document<T: Serialize>(records: &[T]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&DocumentRef {
        version: DOCUMENT_VERSION,
        records,
    })
}

fn decode_document<C, L>(raw: &str, upgrade: impl FnMut(L) -> C) -> Result<Vec<C>, MigrateError>
where
    C: DeserializeOwned,
    L: DeserializeOwned,
{
    let value: Value = serde_json::from_str(raw)?;

    match value {
        Value::Array(_) => decode_legacy(value, upgrade),
        Value::Object(_) => {
            let envelope: Envelope = serde_json::from_value(value)?;
            match envelope.version {
                1 => decode_legacy(envelope.records, upgrade),
                DOCUMENT_VERSION => Ok(serde_json::from_value(envelope.records)?),
                other => Err(MigrateError::UnsupportedVersion(other)),
            }
        }
        _ => Err(MigrateError::UnknownLayout),
    }
}

fn decode_legacy<C, L>(
    records: Value,
    mut upgrade: impl FnMut(L) -> C,
) -> Result<Vec<C>, MigrateError>
where
    C: DeserializeOwned,
    L: DeserializeOwned,
{
    let stored: Vec<Stored<C, L>> = serde_json::from_value(records)?;
    Ok(stored
        .into_iter()
        .map(|record| match record {
            Stored::Current(current) => current,
            Stored::Legacy(legacy) => upgrade(legacy),
        })
        .collect())
}

// =============================================================================
// Collections
// =============================================================================

pub fn decode_products(
    raw: &str,
    defaults: &TierDefaults,
    now: DateTime<Utc>,
) -> Result<Vec<Product>, MigrateError> {
    let products = decode_document(raw, |legacy: LegacyProduct| legacy.upgrade(defaults, now))?;
    Ok(products
        .into_iter()
        .map(|product| normalize_product(product, defaults))
        .collect())
}

pub fn decode_customers(raw: &str, now: DateTime<Utc>) -> Result<Vec<Customer>, MigrateError> {
    decode_document(raw, |legacy: LegacyCustomer| legacy.upgrade(now))
}

pub fn decode_sales(raw: &str, now: DateTime<Utc>) -> Result<Vec<Sale>, MigrateError> {
    decode_document(raw, |legacy: LegacySale| legacy.upgrade(now))
}

pub fn decode_purchases(raw: &str, now: DateTime<Utc>) -> Result<Vec<Purchase>, MigrateError> {
    decode_document(raw, |legacy: LegacyPurchase| legacy.upgrade(now))
}

/// Backfills zero tier entries of an already-current product.
pub fn normalize_product(mut product: Product, defaults: &TierDefaults) -> Product {
    let tiers = product.tiers;
    product.tiers = defaults.backfill(product.reference_price, |tier| Some(tiers.get(tier)));
    product
}

// =============================================================================
// Legacy Shapes
// =============================================================================

/// Rounds a legacy float count; missing, NaN and negative become 0.
fn whole(value: Option<f64>) -> i64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.round() as i64,
        _ => 0,
    }
}

fn money(value: Option<f64>) -> Money {
    value.map(Money::from_major_f64).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyProduct {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    mrp: Option<f64>,
    #[serde(default)]
    price_tiers: Option<BTreeMap<String, Option<f64>>>,
    #[serde(default)]
    prices: Option<BTreeMap<String, Option<f64>>>,
    #[serde(default)]
    volume_points: Option<f64>,
    #[serde(default)]
    stock: Option<f64>,
    #[serde(default)]
    min_stock: Option<f64>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl LegacyProduct {
    fn upgrade(self, defaults: &TierDefaults, now: DateTime<Utc>) -> Product {
        let reference_price = match self.mrp.map(Money::from_major_f64) {
            Some(mrp) if mrp.is_positive() => mrp,
            _ => money(self.price),
        };

        let table = self.price_tiers.or(self.prices).unwrap_or_default();
        let tiers = defaults.backfill(reference_price, |tier| {
            table
                .get(tier.label())
                .copied()
                .flatten()
                .map(Money::from_major_f64)
        });

        let created_at = self.created_at.unwrap_or(now);
        Product {
            id: self.id.unwrap_or_else(new_id),
            name: self.name,
            category: self.category,
            description: self.description,
            reference_price,
            stock: whole(self.stock),
            min_stock: whole(self.min_stock),
            volume_points: self
                .volume_points
                .filter(|vp| vp.is_finite() && *vp > 0.0)
                .unwrap_or(0.0),
            tiers,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyCustomer {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    discount: Option<f64>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl LegacyCustomer {
    fn upgrade(self, now: DateTime<Utc>) -> Customer {
        let created_at = self.created_at.unwrap_or(now);
        Customer {
            id: self.id.unwrap_or_else(new_id),
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            discount_percent: self.discount.filter(|d| d.is_finite()).unwrap_or(0.0),
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacySaleItem {
    #[serde(default)]
    product_id: String,
    #[serde(default)]
    product_name: String,
    #[serde(default)]
    quantity: Option<f64>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    total: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacySale {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    date: Option<DateTime<Utc>>,
    #[serde(default)]
    customer_id: String,
    #[serde(default)]
    customer_name: String,
    #[serde(default)]
    items: Vec<LegacySaleItem>,
    #[serde(default)]
    total: Option<f64>,
}

impl LegacySale {
    fn upgrade(self, now: DateTime<Utc>) -> Sale {
        let items: Vec<SaleLine> = self
            .items
            .into_iter()
            .map(|item| {
                let quantity = whole(item.quantity);
                let unit_price = money(item.price);
                SaleLine {
                    product_id: item.product_id,
                    product_name: item.product_name,
                    quantity,
                    tier: None,
                    unit_price,
                    line_total: item
                        .total
                        .map(Money::from_major_f64)
                        .unwrap_or_else(|| unit_price.multiply_quantity(quantity)),
                    volume_points: 0.0,
                }
            })
            .collect();

        let subtotal: Money = items.iter().map(|l| l.line_total).sum();
        Sale {
            id: self.id.unwrap_or_else(new_id),
            created_at: self.date.unwrap_or(now),
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            items,
            subtotal,
            total: self.total.map(Money::from_major_f64).unwrap_or(subtotal),
            volume_points: 0.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyPurchase {
    #[serde(default)]
    id: Option<String>,
    product_name: String,
    #[serde(default)]
    quantity: Option<f64>,
    #[serde(default)]
    cost: Option<f64>,
    #[serde(default)]
    supplier: String,
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

impl LegacyPurchase {
    fn upgrade(self, now: DateTime<Utc>) -> Purchase {
        let quantity = whole(self.quantity);
        let unit_cost = money(self.cost);
        Purchase {
            id: self.id.unwrap_or_else(new_id),
            created_at: self.date.unwrap_or(now),
            product_name: self.product_name,
            quantity,
            unit_cost,
            supplier: self.supplier,
            total: unit_cost.multiply_quantity(quantity),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
