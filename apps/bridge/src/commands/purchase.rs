//! # Purchase Commands
//!
//! Supplier purchases are a record of cost only: they never change product
//! stock. Restocking is a product edit.

use chrono::Utc;
use tally_core::purchase;
use tally_core::validation::PurchaseInput;
use tally_core::{Collection, Purchase};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Records a purchase from the raw purchase form.
pub async fn record_purchase(
    app: &mut AppState,
    input: PurchaseInput,
) -> Result<Purchase, ApiError> {
    let purchase = purchase::record_purchase(&mut app.store, &input, Utc::now())?;

    info!(
        id = %purchase.id,
        supplier = %purchase.supplier,
        total = %purchase.total,
        "Purchase recorded"
    );

    app.persist(&[Collection::Purchases]).await;
    Ok(purchase)
}

pub fn list_purchases(app: &AppState) -> &[Purchase] {
    app.store.purchases()
}

#[cfg(test)]
mod tests {
    use crate::commands::dispatch;
    use crate::error::ErrorCode;
    use crate::test_support::seeded_state;
    use serde_json::json;

    #[tokio::test]
    async fn test_purchase_does_not_touch_stock() {
        let (mut app, _kv) = seeded_state().await;
        let before = app.store.products().to_vec();

        let purchase = dispatch(
            &mut app,
            "record_purchase",
            json!({
                "productName": "Formula 1 Vanilla",
                "quantity": "5",
                "cost": "20",
                "supplier": "Acme"
            }),
        )
        .await
        .unwrap();

        assert_eq!(purchase["total"], 10000);
        assert_eq!(app.store.products(), before.as_slice());

        let listed = dispatch(&mut app, "list_purchases", json!({})).await.unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_supplier_stores_nothing() {
        let (mut app, _kv) = seeded_state().await;

        let err = dispatch(
            &mut app,
            "record_purchase",
            json!({"productName": "Formula 1 Vanilla", "quantity": "5", "cost": "20"}),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(app.store.purchases().is_empty());
    }
}
