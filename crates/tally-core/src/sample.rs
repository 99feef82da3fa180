//! Sample catalog used to populate a fresh install.

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::pricing::TierDefaults;
use crate::types::{new_id, Customer, Product};

/// (name, category, reference price in cents, stock, min stock, description)
const PRODUCTS: [(&str, &str, i64, i64, i64, &str); 5] = [
    (
        "Formula 1 Vanilla",
        "Nutrition",
        4595,
        25,
        5,
        "Healthy meal replacement shake - Vanilla flavor",
    ),
    (
        "Formula 1 Chocolate",
        "Nutrition",
        4595,
        18,
        5,
        "Healthy meal replacement shake - Chocolate flavor",
    ),
    (
        "Tea Concentrate",
        "Energy",
        3295,
        12,
        3,
        "Herbal tea concentrate for energy and focus",
    ),
    (
        "Aloe Concentrate",
        "Digestive Health",
        2895,
        8,
        5,
        "Soothing aloe vera concentrate",
    ),
    (
        "Multivitamin",
        "Nutrition",
        3595,
        2,
        5,
        "Complete daily multivitamin supplement",
    ),
];

/// (name, email, phone, address)
const CUSTOMERS: [(&str, &str, &str, &str); 3] = [
    (
        "Sarah Johnson",
        "sarah.johnson@email.com",
        "+1 (555) 123-4567",
        "123 Oak Street, Austin, TX 78701",
    ),
    (
        "Michael Brown",
        "michael.brown@email.com",
        "+1 (555) 234-5678",
        "456 Pine Avenue, Dallas, TX 75201",
    ),
    (
        "Emily Davis",
        "emily.davis@email.com",
        "+1 (555) 345-6789",
        "789 Elm Boulevard, Houston, TX 77001",
    ),
];

pub fn sample_products(defaults: &TierDefaults, now: DateTime<Utc>) -> Vec<Product> {
    PRODUCTS
        .iter()
        .map(
            |&(name, category, price_cents, stock, min_stock, description)| {
                let reference_price = Money::from_cents(price_cents);
                Product {
                    id: new_id(),
                    name: name.to_string(),
                    category: category.to_string(),
                    description: description.to_string(),
                    reference_price,
                    stock,
                    min_stock,
                    volume_points: 0.0,
                    tiers: defaults.backfill(reference_price, |_| None),
                    created_at: now,
                    updated_at: now,
                }
            },
        )
        .collect()
}

pub fn sample_customers(now: DateTime<Utc>) -> Vec<Customer> {
    CUSTOMERS
        .iter()
        .map(|&(name, email, phone, address)| Customer {
            id: new_id(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            address: address.to_string(),
            discount_percent: 0.0,
            created_at: now,
            updated_at: now,
        })
        .collect()
}
