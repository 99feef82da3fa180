//! # Product Commands
//!
//! Product listing, search and catalog maintenance.
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Product Form Submit                                  │
//! │                                                                         │
//! │  {"cmd": "save_product", "args": {"id": null, "input": {...}}}          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductInput::validate ──► Err ──► VALIDATION_ERROR (nothing changes)  │
//! │       │ Ok(ProductDraft)   (missing tier prices backfilled)             │
//! │       ▼                                                                 │
//! │  id? ── none ──► Store::add_product                                     │
//! │       └─ some ──► Store::update_product ── stale id ──► found: false    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  persist(products) ── failure ──► Notice (change kept)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tally_core::pricing::{tier_margins, TierMargin};
use tally_core::report;
use tally_core::stock::{classify, needs_reorder};
use tally_core::validation::{validate_search_query, ProductInput};
use tally_core::{Collection, Money, Product, StockStatus};
use tracing::{debug, info};

use super::{Deleted, IdArgs, Saved};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchArgs {
    pub query: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveProductArgs {
    /// `None` creates a new product.
    #[serde(default)]
    pub id: Option<String>,
    pub input: ProductInput,
}

/// Product with its derived figures, for the detail view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail<'a> {
    pub product: &'a Product,
    pub status: StockStatus,
    pub status_label: &'static str,
    pub needs_reorder: bool,
    pub inventory_value: Money,
    pub margins: Vec<TierMargin>,
}

/// Every product, in catalog order.
pub fn list_products(app: &AppState) -> &[Product] {
    debug!("list_products command");
    app.store.products()
}

/// Case-insensitive search on name or category. An empty query lists all.
pub fn search_products<'a>(
    app: &'a AppState,
    args: SearchArgs,
) -> Result<Vec<&'a Product>, ApiError> {
    let start = Instant::now();
    let query = validate_search_query(&args.query)?;

    let products = report::search_products(&app.store, &query);

    debug!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        count = products.len(),
        query = %query,
        "search_products complete"
    );
    Ok(products)
}

/// One product with status and tier margins.
pub fn get_product(app: &AppState, args: IdArgs) -> Result<ProductDetail<'_>, ApiError> {
    debug!(id = %args.id, "get_product command");
    let product = app
        .store
        .product(&args.id)
        .ok_or_else(|| ApiError::not_found("Product", &args.id))?;

    let status = classify(product);
    Ok(ProductDetail {
        product,
        status,
        status_label: status.label(),
        needs_reorder: needs_reorder(product),
        inventory_value: product.inventory_value(),
        margins: tier_margins(product),
    })
}

/// Creates or updates a product from raw form input.
pub async fn save_product(
    app: &mut AppState,
    args: SaveProductArgs,
) -> Result<Saved<Product>, ApiError> {
    let draft = args.input.validate(app.store.tier_defaults())?;
    let now = Utc::now();

    let saved = match args.id {
        None => Some(app.store.add_product(draft, now)),
        Some(id) => app.store.update_product(&id, draft, now),
    };

    let Some(product) = saved else {
        debug!("save_product: product no longer exists");
        return Ok(Saved::stale());
    };

    info!(id = %product.id, name = %product.name, "Product saved");
    app.persist(&[Collection::Products]).await;
    Ok(Saved::found(product))
}

/// Deletes a product. Past sales keep their own copy of its name.
pub async fn delete_product(app: &mut AppState, args: IdArgs) -> Deleted {
    let found = app.store.delete_product(&args.id);
    if found {
        info!(id = %args.id, "Product deleted");
        app.persist(&[Collection::Products]).await;
    }
    Deleted { found }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::dispatch;
    use crate::test_support::seeded_state;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn input(name: &str, price: &str) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            category: "Nutrition".to_string(),
            reference_price: price.to_string(),
            stock: "10".to_string(),
            min_stock: "5".to_string(),
            volume_points: "2".to_string(),
            tiers: BTreeMap::from([("42".to_string(), "29".to_string())]),
            ..ProductInput::default()
        }
    }

    #[tokio::test]
    async fn test_create_backfills_tiers_and_persists() {
        let (mut app, kv) = seeded_state().await;

        let saved = save_product(
            &mut app,
            SaveProductArgs {
                id: None,
                input: input("Protein Bar", "50"),
            },
        )
        .await
        .unwrap();

        let product = saved.record.unwrap();
        assert_eq!(product.tiers.get(tally_core::Tier::T42).cents(), 2900);
        assert_eq!(product.tiers.get(tally_core::Tier::T25).cents(), 3750);
        assert_eq!(app.store.products().len(), 6);
        assert!(kv.get("tally_products").await.unwrap().contains("Protein Bar"));
    }

    #[tokio::test]
    async fn test_invalid_input_changes_nothing() {
        let (mut app, _kv) = seeded_state().await;

        let err = save_product(
            &mut app,
            SaveProductArgs {
                id: None,
                input: input("", "50"),
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
        assert_eq!(app.store.products().len(), 5);
    }

    #[tokio::test]
    async fn test_oversized_stock_is_rejected_and_dashboard_stays_sane() {
        let (mut app, kv) = seeded_state().await;
        let before = kv.get("tally_products").await.unwrap();

        let mut huge = input("Bulk Tea", "1.00");
        huge.stock = i64::MAX.to_string();
        let err = save_product(
            &mut app,
            SaveProductArgs {
                id: None,
                input: huge,
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
        assert!(err.message.contains("stock"));
        assert_eq!(kv.get("tally_products").await.unwrap(), before);

        let stats = dispatch(&mut app, "dashboard", json!({})).await.unwrap();
        assert!(stats["totalInventoryValue"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_stale_id_is_not_an_error() {
        let (mut app, _kv) = seeded_state().await;

        let saved = save_product(
            &mut app,
            SaveProductArgs {
                id: Some("gone".to_string()),
                input: input("Protein Bar", "50"),
            },
        )
        .await
        .unwrap();
        assert!(!saved.found);

        let deleted = delete_product(&mut app, IdArgs { id: "gone".into() }).await;
        assert!(!deleted.found);
    }

    #[tokio::test]
    async fn test_search_and_detail_through_dispatch() {
        let (mut app, _kv) = seeded_state().await;

        let found = dispatch(&mut app, "search_products", json!({"query": "FORMULA"}))
            .await
            .unwrap();
        assert_eq!(found.as_array().unwrap().len(), 2);

        let id = found[0]["id"].as_str().unwrap().to_string();
        let detail = dispatch(&mut app, "get_product", json!({ "id": id }))
            .await
            .unwrap();
        assert_eq!(detail["status"], "in_stock");
        assert_eq!(detail["statusLabel"], "In Stock");
        assert_eq!(detail["margins"].as_array().unwrap().len(), 4);

        let err = dispatch(&mut app, "get_product", json!({"id": "nope"}))
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::NotFound);
    }
}
