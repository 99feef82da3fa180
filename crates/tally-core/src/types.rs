//! # Domain Types
//!
//! Core records owned by the [`Store`](crate::store::Store).
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    Purchase     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  reference_price│   │  customer_name  │   │  product_name   │       │
//! │  │  tiers ─────────┼─┐ │  items[SaleLine]│   │  unit_cost      │       │
//! │  │  stock/min_stock│ │ │  subtotal/total │   │  supplier       │       │
//! │  └─────────────────┘ │ └─────────────────┘   └─────────────────┘       │
//! │                      ▼                                                  │
//! │              ┌─────────────────┐   ┌─────────────────┐                  │
//! │              │   TierTable     │   │    Customer     │                  │
//! │              │  "25" "35"      │   │  name, phone    │                  │
//! │              │  "42" "50"      │   │  discount %     │                  │
//! │              └─────────────────┘   └─────────────────┘                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Sales copy the customer name and every product's name and price at commit
//! time. Editing or deleting a product or customer later never rewrites
//! history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

/// Generates a new opaque record id (UUID v4).
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Tier
// =============================================================================

/// A named discount level. The label is the discount percentage the tier
/// represents, and is what the frontend and the stored documents use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Tier {
    #[serde(rename = "25")]
    T25,
    #[serde(rename = "35")]
    T35,
    #[serde(rename = "42")]
    T42,
    #[serde(rename = "50")]
    T50,
}

impl Tier {
    /// Every tier, in ascending discount order.
    pub const ALL: [Tier; 4] = [Tier::T25, Tier::T35, Tier::T42, Tier::T50];

    pub const fn label(&self) -> &'static str {
        match self {
            Tier::T25 => "25",
            Tier::T35 => "35",
            Tier::T42 => "42",
            Tier::T50 => "50",
        }
    }

    /// Parses a tier label (`"42"`, also accepting `"42%"`).
    pub fn from_label(label: &str) -> Option<Tier> {
        let label = label.trim();
        let label = label.strip_suffix('%').unwrap_or(label);
        Tier::ALL.into_iter().find(|t| t.label() == label)
    }

    /// All labels, for error messages.
    pub fn labels() -> Vec<String> {
        Tier::ALL.iter().map(|t| t.label().to_string()).collect()
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.label())
    }
}

// =============================================================================
// Tier Table
// =============================================================================

/// A complete tier price table: exactly one unit price per [`Tier`].
///
/// Completeness is structural. Partial tables only exist in raw form input
/// and legacy documents, and are backfilled by
/// [`TierDefaults::backfill`](crate::pricing::TierDefaults::backfill) before
/// a `TierTable` is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TierTable {
    #[serde(rename = "25")]
    t25: Money,
    #[serde(rename = "35")]
    t35: Money,
    #[serde(rename = "42")]
    t42: Money,
    #[serde(rename = "50")]
    t50: Money,
}

impl TierTable {
    /// Builds a table by asking for the price of every tier.
    pub fn from_fn(mut price: impl FnMut(Tier) -> Money) -> Self {
        TierTable {
            t25: price(Tier::T25),
            t35: price(Tier::T35),
            t42: price(Tier::T42),
            t50: price(Tier::T50),
        }
    }

    pub fn get(&self, tier: Tier) -> Money {
        match tier {
            Tier::T25 => self.t25,
            Tier::T35 => self.t35,
            Tier::T42 => self.t42,
            Tier::T50 => self.t50,
        }
    }

    /// `(tier, price)` pairs in ascending discount order.
    pub fn entries(&self) -> [(Tier, Money); 4] {
        Tier::ALL.map(|tier| (tier, self.get(tier)))
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Opaque unique identifier.
    pub id: String,

    /// Display name shown on the sale form and invoices.
    pub name: String,

    pub category: String,

    #[serde(default)]
    pub description: String,

    /// Maximum retail price. Pricing fallback and margin baseline.
    pub reference_price: Money,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// At or below this level the product is reported as low stock.
    pub min_stock: i64,

    /// Loyalty/reporting weight per unit; 0 when the product has none.
    #[serde(default)]
    pub volume_points: f64,

    /// Unit price per discount tier.
    pub tiers: TierTable,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Inventory value at reference price (stock × reference price).
    #[inline]
    pub fn inventory_value(&self) -> Money {
        self.reference_price.multiply_quantity(self.stock)
    }

    /// Volume points carried by the current stock.
    #[inline]
    pub fn stock_volume_points(&self) -> f64 {
        self.stock as f64 * self.volume_points
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer who can be selected on a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    /// Informational only; tiers are chosen explicitly per sale line.
    #[serde(default, alias = "discount")]
    pub discount_percent: f64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub customer_id: String,
    /// Customer name at time of sale (frozen).
    pub customer_name: String,
    pub items: Vec<SaleLine>,
    /// Σ line totals.
    pub subtotal: Money,
    /// Equal to `subtotal`: no tax is applied.
    pub total: Money,
    /// Σ line volume points.
    pub volume_points: f64,
}

/// A line item in a committed sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Tier the price was resolved from; `None` for list price or a manual
    /// override.
    pub tier: Option<Tier>,
    /// Unit price at time of sale (frozen).
    pub unit_price: Money,
    /// quantity × unit_price.
    pub line_total: Money,
    pub volume_points: f64,
}

// =============================================================================
// Purchase
// =============================================================================

/// Stock received from a supplier.
///
/// `product_name` is free text and is NOT linked to a [`Product`]; recording
/// a purchase never changes any product's stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub product_name: String,
    pub quantity: i64,
    pub unit_cost: Money,
    pub supplier: String,
    /// quantity × unit_cost.
    pub total: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_labels() {
        assert_eq!(Tier::T42.label(), "42");
        assert_eq!(Tier::from_label("35"), Some(Tier::T35));
        assert_eq!(Tier::from_label(" 50% "), Some(Tier::T50));
        assert_eq!(Tier::from_label("30"), None);
        assert_eq!(Tier::T25.to_string(), "25%");
    }

    #[test]
    fn test_tier_table_serializes_with_labels() {
        let table = TierTable::from_fn(|tier| match tier {
            Tier::T25 => Money::from_cents(3750),
            Tier::T35 => Money::from_cents(3250),
            Tier::T42 => Money::from_cents(2900),
            Tier::T50 => Money::from_cents(2500),
        });

        let json = serde_json::to_value(table).unwrap();
        assert_eq!(json["42"], 2900);
        assert_eq!(json["25"], 3750);

        let back: TierTable = serde_json::from_value(json).unwrap();
        assert_eq!(back.get(Tier::T50), Money::from_cents(2500));
    }

    #[test]
    fn test_tier_serializes_as_label() {
        assert_eq!(serde_json::to_string(&Tier::T42).unwrap(), "\"42\"");
        let tier: Tier = serde_json::from_str("\"35\"").unwrap();
        assert_eq!(tier, Tier::T35);
    }

    #[test]
    fn test_new_ids_are_unique() {
        assert_ne!(new_id(), new_id());
    }
}
