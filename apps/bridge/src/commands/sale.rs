//! # Sale Commands
//!
//! Editing the draft sale on the sale form and completing it.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Sale Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ Editing  │────►│  Ready   │────►│ Committed│       │
//! │  │  draft   │     │          │     │          │     │   Sale   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                │             │
//! │              set_line_product     select_customer   complete_sale       │
//! │              set_line_tier                                 │             │
//! │              set_line_quantity                             ▼             │
//! │              step_line_quantity              stock decremented,          │
//! │              set_line_price                  sales + products saved,     │
//! │              add/remove_sale_line            draft reset                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every draft command answers with the change outcome and the full draft,
//! so the form can redraw from one response.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tally_core::validation::parse_money;
use tally_core::{Collection, LineChange, Sale, SaleDraft, Tier};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{AppState, Notice};

/// Outcome of a draft edit plus the draft after it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftUpdate {
    pub change: LineChange,
    pub draft: SaleDraft,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexArgs {
    pub index: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetProductArgs {
    pub index: usize,
    pub product_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetTierArgs {
    pub index: usize,
    /// `null` returns the line to the list price.
    #[serde(default)]
    pub tier: Option<Tier>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetQuantityArgs {
    pub index: usize,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepArgs {
    pub index: usize,
    pub delta: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetPriceArgs {
    pub index: usize,
    /// Raw text from the price field.
    pub price: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectCustomerArgs {
    pub customer_id: String,
}

fn update(app: &mut AppState, change: LineChange) -> DraftUpdate {
    if let LineChange::Rejected(warning) = &change {
        debug!(
            product = %warning.product_name,
            requested = warning.requested,
            "Quantity change rejected"
        );
        app.notify(Notice::warning(warning.message()));
    }
    DraftUpdate {
        change,
        draft: app.sale.snapshot(),
    }
}

pub fn get_sale_draft(app: &AppState) -> SaleDraft {
    app.sale.snapshot()
}

pub fn add_sale_line(app: &mut AppState) -> Result<DraftUpdate, ApiError> {
    let index = app.sale.add_line()?;
    debug!(index, "add_sale_line command");
    Ok(update(app, LineChange::Applied))
}

pub fn remove_sale_line(app: &mut AppState, args: IndexArgs) -> Result<DraftUpdate, ApiError> {
    let change = app.sale.remove_line(args.index)?;
    Ok(update(app, change))
}

pub fn set_line_product(app: &mut AppState, args: SetProductArgs) -> DraftUpdate {
    let change = app
        .sale
        .set_product(args.index, &args.product_id, app.store.products());
    update(app, change)
}

pub fn set_line_tier(app: &mut AppState, args: SetTierArgs) -> DraftUpdate {
    let change = app.sale.set_tier(args.index, args.tier, app.store.products());
    update(app, change)
}

pub fn set_line_quantity(
    app: &mut AppState,
    args: SetQuantityArgs,
) -> Result<DraftUpdate, ApiError> {
    let change = app
        .sale
        .set_quantity(args.index, args.quantity, app.store.products())?;
    Ok(update(app, change))
}

/// The +/- stepper next to the quantity field.
pub fn step_line_quantity(app: &mut AppState, args: StepArgs) -> Result<DraftUpdate, ApiError> {
    let change = app
        .sale
        .step_quantity(args.index, args.delta, app.store.products())?;
    Ok(update(app, change))
}

/// Manual unit price; the line stops following its tier.
pub fn set_line_price(app: &mut AppState, args: SetPriceArgs) -> Result<DraftUpdate, ApiError> {
    let price = parse_money("price", &args.price)?;
    let change = app.sale.set_price(args.index, price)?;
    Ok(update(app, change))
}

pub fn select_customer(app: &mut AppState, args: SelectCustomerArgs) -> DraftUpdate {
    let change = if app
        .sale
        .select_customer(&args.customer_id, app.store.customers())
    {
        LineChange::Applied
    } else {
        LineChange::Unchanged
    };
    update(app, change)
}

/// Commits the draft: stock is decremented and the sale recorded.
pub async fn complete_sale(app: &mut AppState) -> Result<Sale, ApiError> {
    let sale = app.sale.commit(&mut app.store, Utc::now())?;

    info!(
        sale_id = %sale.id,
        customer = %sale.customer_name,
        lines = sale.items.len(),
        total = %sale.total,
        "Sale completed"
    );

    app.persist(&[Collection::Sales, Collection::Products]).await;
    app.notify(Notice::info("Sale completed successfully"));
    Ok(sale)
}

pub fn list_sales(app: &AppState) -> &[Sale] {
    app.store.sales()
}

// =============================================================================
// Unit Tests
// =============================================================================
