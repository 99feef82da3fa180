//! # Document Commands
//!
//! Text invoices and the pre-filled bill message link. Both read committed
//! records only; the draft sale is never involved.

use serde::{Deserialize, Serialize};
use tally_core::receipt::{
    bill_message, invoice_file_name, message_link, render_purchase_invoice, render_sale_invoice,
};
use tally_core::ValidationError;
use tracing::debug;

use super::IdArgs;
use crate::error::ApiError;
use crate::state::AppState;

/// A rendered text document and a suggested file name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub file_name: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillLinkArgs {
    pub sale_id: String,
    /// Overrides the customer's stored phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BillLink {
    pub message: String,
    pub link: String,
}

pub fn sale_invoice(app: &AppState, args: IdArgs) -> Result<Document, ApiError> {
    debug!(id = %args.id, "sale_invoice command");
    let sale = app
        .store
        .sale(&args.id)
        .ok_or_else(|| ApiError::not_found("Sale", &args.id))?;

    let discount = app
        .store
        .customer(&sale.customer_id)
        .map_or(0.0, |c| c.discount_percent);

    Ok(Document {
        file_name: invoice_file_name("sale", &sale.id),
        content: render_sale_invoice(sale, discount, &app.config.invoice_layout()),
    })
}

pub fn purchase_invoice(app: &AppState, args: IdArgs) -> Result<Document, ApiError> {
    debug!(id = %args.id, "purchase_invoice command");
    let purchase = app
        .store
        .purchase(&args.id)
        .ok_or_else(|| ApiError::not_found("Purchase", &args.id))?;

    Ok(Document {
        file_name: invoice_file_name("purchase", &purchase.id),
        content: render_purchase_invoice(purchase, &app.config.invoice_layout()),
    })
}

/// Bill text for a sale and the link that opens it in a chat with the
/// customer.
pub fn bill_link(app: &AppState, args: BillLinkArgs) -> Result<BillLink, ApiError> {
    let sale = app
        .store
        .sale(&args.sale_id)
        .ok_or_else(|| ApiError::not_found("Sale", &args.sale_id))?;

    let phone = match args.phone {
        Some(phone) => phone,
        None => app
            .store
            .customer(&sale.customer_id)
            .map(|c| c.phone.clone())
            .ok_or_else(|| ValidationError::required("phone"))?,
    };

    let message = bill_message(sale, &app.config.store_name, &app.config.currency_symbol);
    let link = message_link(&phone, &message)?;

    Ok(BillLink { message, link })
}

#[cfg(test)]
mod tests {
    use crate::commands::dispatch;
    use crate::error::ErrorCode;
    use crate::test_support::{complete_sale_of, seeded_state};
    use serde_json::json;

    #[tokio::test]
    async fn test_sale_invoice() {
        let (mut app, _kv) = seeded_state().await;
        let sale = complete_sale_of(&mut app, "Aloe Concentrate", 1).await;

        let doc = dispatch(&mut app, "sale_invoice", json!({ "id": sale.id }))
            .await
            .unwrap();

        assert_eq!(doc["fileName"], format!("sale-invoice-{}.txt", sale.id));
        let content = doc["content"].as_str().unwrap();
        assert!(content.starts_with("Gratitude Nutrition Club"));
        assert!(content.contains("Aloe Concentrate"));
        assert!(content.contains("₹28.95"));
        assert!(!content.contains("Discount Applied"));
    }

    #[tokio::test]
    async fn test_sale_invoice_prints_customer_discount() {
        let (mut app, _kv) = seeded_state().await;
        let sale = complete_sale_of(&mut app, "Aloe Concentrate", 1).await;

        dispatch(
            &mut app,
            "save_customer",
            json!({
                "id": sale.customer_id,
                "input": {"name": "Sarah Johnson", "discountPercent": "10"}
            }),
        )
        .await
        .unwrap();

        let doc = dispatch(&mut app, "sale_invoice", json!({ "id": sale.id }))
            .await
            .unwrap();
        let content = doc["content"].as_str().unwrap();
        assert!(content.contains("Discount Applied: 10%\n"));
        assert!(content.trim_end().ends_with("₹28.95"));

        let today = dispatch(&mut app, "daily_sales", json!({})).await.unwrap();
        assert_eq!(today["rows"][0]["discountPercent"], 10.0);
    }

    #[tokio::test]
    async fn test_bill_link_uses_customer_phone() {
        let (mut app, _kv) = seeded_state().await;
        let sale = complete_sale_of(&mut app, "Aloe Concentrate", 1).await;

        let bill = dispatch(&mut app, "bill_link", json!({ "saleId": sale.id }))
            .await
            .unwrap();

        // Sarah Johnson, +1 (555) 123-4567
        assert!(bill["link"]
            .as_str()
            .unwrap()
            .starts_with("https://wa.me/15551234567?text="));
        assert!(bill["message"].as_str().unwrap().contains("Dear Sarah Johnson,"));

        let err = dispatch(
            &mut app,
            "bill_link",
            json!({ "saleId": sale.id, "phone": "n/a" }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_unknown_records_are_not_found() {
        let (mut app, _kv) = seeded_state().await;

        for cmd in ["sale_invoice", "purchase_invoice"] {
            let err = dispatch(&mut app, cmd, json!({"id": "missing"}))
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::NotFound);
        }
    }
}
