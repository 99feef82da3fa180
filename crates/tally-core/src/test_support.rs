//! Fixtures shared by the unit tests.

use chrono::Utc;

use crate::money::Money;
use crate::pricing::TierDefaults;
use crate::types::{new_id, Customer, Product};

/// A "Formula 1 Vanilla" product with default-backfilled tiers.
pub fn product_with(reference_cents: i64, stock: i64, min_stock: i64, vp: f64) -> Product {
    let reference_price = Money::from_cents(reference_cents);
    let now = Utc::now();
    Product {
        id: new_id(),
        name: "Formula 1 Vanilla".to_string(),
        category: "Nutrition".to_string(),
        description: String::new(),
        reference_price,
        stock,
        min_stock,
        volume_points: vp,
        tiers: TierDefaults::default().backfill(reference_price, |_| None),
        created_at: now,
        updated_at: now,
    }
}

pub fn customer_named(name: &str) -> Customer {
    let now = Utc::now();
    Customer {
        id: new_id(),
        name: name.to_string(),
        email: String::new(),
        phone: "+1 (555) 123-4567".to_string(),
        address: String::new(),
        discount_percent: 0.0,
        created_at: now,
        updated_at: now,
    }
}
