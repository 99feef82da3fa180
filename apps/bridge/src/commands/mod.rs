//! # Commands Module
//!
//! All commands exposed to the frontend over the IPC channel.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (dispatch table)
//! ├── product.rs   ◄─── Product listing, search, CRUD
//! ├── customer.rs  ◄─── Customer CRUD
//! ├── sale.rs      ◄─── Sale draft editing and completion
//! ├── purchase.rs  ◄─── Supplier purchases
//! ├── report.rs    ◄─── Dashboard, daily sales, stock report
//! ├── document.rs  ◄─── Text invoices and bill links
//! └── config.rs    ◄─── Configuration retrieval, clear-all
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  {"id": 7, "cmd": "set_line_quantity", "args": {"index": 0, ...}}      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  dispatch(&mut AppState, "set_line_quantity", args)                     │
//! │         │  args ──► SetQuantityArgs (serde)                             │
//! │         ▼                                                               │
//! │  sale::set_line_quantity(app, args) -> Result<DraftUpdate, ApiError>    │
//! │         │                                                               │
//! │         ▼ (JSON serialization)                                          │
//! │  {"id": 7, "ok": true, "data": {...}, "notices": []}                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod customer;
pub mod document;
pub mod product;
pub mod purchase;
pub mod report;
pub mod sale;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

/// Names of every command [`dispatch`] understands.
pub const COMMANDS: &[&str] = &[
    "list_products",
    "search_products",
    "get_product",
    "save_product",
    "delete_product",
    "list_customers",
    "save_customer",
    "delete_customer",
    "get_sale_draft",
    "add_sale_line",
    "remove_sale_line",
    "set_line_product",
    "set_line_tier",
    "set_line_quantity",
    "step_line_quantity",
    "set_line_price",
    "select_customer",
    "complete_sale",
    "list_sales",
    "record_purchase",
    "list_purchases",
    "dashboard",
    "daily_sales",
    "stock_report",
    "sale_invoice",
    "purchase_invoice",
    "bill_link",
    "clear_all_data",
    "get_config",
];

/// Runs one command against the session state.
pub async fn dispatch(app: &mut AppState, cmd: &str, args: Value) -> Result<Value, ApiError> {
    match cmd {
        // Products
        "list_products" => reply(product::list_products(app)),
        "search_products" => reply(product::search_products(app, parse(args)?)?),
        "get_product" => reply(product::get_product(app, parse(args)?)?),
        "save_product" => reply(product::save_product(app, parse(args)?).await?),
        "delete_product" => reply(product::delete_product(app, parse(args)?).await),

        // Customers
        "list_customers" => reply(customer::list_customers(app)),
        "save_customer" => reply(customer::save_customer(app, parse(args)?).await?),
        "delete_customer" => reply(customer::delete_customer(app, parse(args)?).await),

        // Sale draft
        "get_sale_draft" => reply(sale::get_sale_draft(app)),
        "add_sale_line" => reply(sale::add_sale_line(app)?),
        "remove_sale_line" => reply(sale::remove_sale_line(app, parse(args)?)?),
        "set_line_product" => reply(sale::set_line_product(app, parse(args)?)),
        "set_line_tier" => reply(sale::set_line_tier(app, parse(args)?)),
        "set_line_quantity" => reply(sale::set_line_quantity(app, parse(args)?)?),
        "step_line_quantity" => reply(sale::step_line_quantity(app, parse(args)?)?),
        "set_line_price" => reply(sale::set_line_price(app, parse(args)?)?),
        "select_customer" => reply(sale::select_customer(app, parse(args)?)),
        "complete_sale" => reply(sale::complete_sale(app).await?),
        "list_sales" => reply(sale::list_sales(app)),

        // Purchases
        "record_purchase" => reply(purchase::record_purchase(app, parse(args)?).await?),
        "list_purchases" => reply(purchase::list_purchases(app)),

        // Reports
        "dashboard" => reply(report::dashboard(app)),
        "daily_sales" => reply(report::daily_sales(app, parse(args)?)),
        "stock_report" => reply(report::stock_report(app, parse(args)?)),

        // Documents
        "sale_invoice" => reply(document::sale_invoice(app, parse(args)?)?),
        "purchase_invoice" => reply(document::purchase_invoice(app, parse(args)?)?),
        "bill_link" => reply(document::bill_link(app, parse(args)?)?),

        // Admin
        "clear_all_data" => reply(config::clear_all_data(app).await?),
        "get_config" => reply(config::get_config(app)),

        other => Err(ApiError::bad_request(format!("Unknown command: {}", other))),
    }
}

/// Decodes command arguments. A missing `args` reads as `{}`.
fn parse<T: DeserializeOwned>(args: Value) -> Result<T, ApiError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    Ok(serde_json::from_value(args)?)
}

fn reply<T: Serialize>(data: T) -> Result<Value, ApiError> {
    serde_json::to_value(data).map_err(|e| ApiError::internal(e.to_string()))
}

// =============================================================================
// Shared Argument / Result Shapes
// =============================================================================

/// `{"id": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub struct IdArgs {
    pub id: String,
}

/// Outcome of an edit or delete addressed by id.
///
/// A stale id is not an error: `found` is `false` and nothing changed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Saved<T> {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<T>,
}

impl<T> Saved<T> {
    pub fn found(record: T) -> Self {
        Saved {
            found: true,
            record: Some(record),
        }
    }

    pub fn stale() -> Self {
        Saved {
            found: false,
            record: None,
        }
    }
}

/// Result of a delete.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Deleted {
    pub found: bool,
}
