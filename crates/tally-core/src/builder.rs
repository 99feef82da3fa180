//! # Sale Builder
//!
//! The working list of lines for a sale that has not been committed yet.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌─────────┐  set_product   ┌─────────┐  every line has a product,     │
//! │   │  Empty  │ ─────────────► │ Editing │  quantity > 0 and a customer   │
//! │   └─────────┘                └─────────┘  is selected                   │
//! │        ▲                          │  ▲                                  │
//! │        │                          ▼  │                                  │
//! │        │                     ┌─────────┐                                │
//! │        └──── reset ◄──────── │  Ready  │ ──── commit ──► Sale           │
//! │                              └─────────┘                                │
//! │                                                                         │
//! │   State is derived from content, never stored.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Line Operations
//! All line operations take an index. An index past the end is a no-op
//! (`LineChange::Unchanged`), as is an unknown product id. Quantity changes
//! that exceed stock come back as `LineChange::Rejected` and leave the line
//! as it was. Totals are recomputed from scratch after every mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing;
use crate::stock;
use crate::store::Store;
use crate::types::{new_id, Customer, Product, Sale, SaleLine, Tier};
use crate::validation::{validate_price, validate_quantity};
use crate::{MAX_ITEM_QUANTITY, MAX_SALE_LINES};

// =============================================================================
// Draft Line
// =============================================================================

/// A line of the sale being built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DraftLine {
    /// `None` until a product is chosen.
    pub product_id: Option<String>,
    pub product_name: String,
    pub quantity: i64,
    pub tier: Option<Tier>,
    pub unit_price: Money,
    pub line_total: Money,
    /// Volume-point weight of one unit of the chosen product.
    pub unit_volume_points: f64,
    pub volume_points: f64,
}

impl DraftLine {
    fn blank(tier: Option<Tier>) -> Self {
        DraftLine {
            product_id: None,
            product_name: String::new(),
            quantity: 1,
            tier,
            unit_price: Money::zero(),
            line_total: Money::zero(),
            unit_volume_points: 0.0,
            volume_points: 0.0,
        }
    }

    fn is_complete(&self) -> bool {
        self.product_id.is_some() && self.quantity > 0
    }

    fn recompute(&mut self) {
        self.line_total = pricing::line_total(self.quantity, self.unit_price);
        self.volume_points = self.quantity as f64 * self.unit_volume_points;
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Why a quantity change was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockWarning {
    pub product_name: String,
    pub available: i64,
    pub requested: i64,
}

impl StockWarning {
    pub fn message(&self) -> String {
        format!(
            "Insufficient stock for {}. Available: {}",
            self.product_name, self.available
        )
    }
}

/// Result of a line operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LineChange {
    Applied,
    /// Stale index or unknown product: nothing happened.
    Unchanged,
    /// Refused because of stock; the previous values are kept.
    Rejected(StockWarning),
}

/// Derived builder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BuilderState {
    /// No line has a product yet.
    Empty,
    Editing,
    /// Committable.
    Ready,
}

/// Running totals of the draft.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotals {
    pub subtotal: Money,
    /// Same as `subtotal`: no tax is applied.
    pub total: Money,
    pub volume_points: f64,
    pub line_count: usize,
}

/// Serializable view of the whole draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleDraft {
    pub lines: Vec<DraftLine>,
    pub customer_id: Option<String>,
    pub state: BuilderState,
    pub totals: SaleTotals,
}

// =============================================================================
// Sale Builder
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SaleBuilder {
    lines: Vec<DraftLine>,
    customer_id: Option<String>,
    default_tier: Option<Tier>,
    totals: SaleTotals,
}

impl Default for SaleBuilder {
    fn default() -> Self {
        SaleBuilder::new()
    }
}

impl SaleBuilder {
    /// A builder with one blank line priced at list price.
    pub fn new() -> Self {
        let mut builder = SaleBuilder {
            lines: Vec::new(),
            customer_id: None,
            default_tier: None,
            totals: SaleTotals::default(),
        };
        builder.reset();
        builder
    }

    /// Sets the tier new lines start with. `None` means list price.
    pub fn with_default_tier(mut self, tier: Option<Tier>) -> Self {
        self.default_tier = tier;
        for line in self.lines.iter_mut().filter(|l| l.product_id.is_none()) {
            line.tier = tier;
        }
        self
    }

    /// Back to a single blank line with no customer.
    pub fn reset(&mut self) {
        self.lines = vec![DraftLine::blank(self.default_tier)];
        self.customer_id = None;
        self.recompute_totals();
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    pub fn totals(&self) -> SaleTotals {
        self.totals
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    pub fn default_tier(&self) -> Option<Tier> {
        self.default_tier
    }

    pub fn state(&self) -> BuilderState {
        if self.lines.iter().all(|l| l.product_id.is_none()) {
            BuilderState::Empty
        } else if self.customer_id.is_some() && self.lines.iter().all(DraftLine::is_complete) {
            BuilderState::Ready
        } else {
            BuilderState::Editing
        }
    }

    pub fn snapshot(&self) -> SaleDraft {
        SaleDraft {
            lines: self.lines.clone(),
            customer_id: self.customer_id.clone(),
            state: self.state(),
            totals: self.totals,
        }
    }

    // -------------------------------------------------------------------------
    // Lines
    // -------------------------------------------------------------------------

    /// Appends a blank line and returns its index.
    pub fn add_line(&mut self) -> CoreResult<usize> {
        if self.lines.len() >= MAX_SALE_LINES {
            return Err(CoreError::TooManyLines {
                max: MAX_SALE_LINES,
            });
        }
        self.lines.push(DraftLine::blank(self.default_tier));
        self.recompute_totals();
        Ok(self.lines.len() - 1)
    }

    /// Removes a line. The last remaining line cannot be removed.
    pub fn remove_line(&mut self, index: usize) -> CoreResult<LineChange> {
        if index >= self.lines.len() {
            return Ok(LineChange::Unchanged);
        }
        if self.lines.len() == 1 {
            return Err(CoreError::LastLine);
        }
        self.lines.remove(index);
        self.recompute_totals();
        Ok(LineChange::Applied)
    }

    /// Chooses the product of a line and prices it at the line's tier.
    ///
    /// The current quantity must be available for the new product.
    pub fn set_product(
        &mut self,
        index: usize,
        product_id: &str,
        catalog: &[Product],
    ) -> LineChange {
        let Some(product) = catalog.iter().find(|p| p.id == product_id) else {
            return LineChange::Unchanged;
        };
        let Some(line) = self.lines.get_mut(index) else {
            return LineChange::Unchanged;
        };

        if let Err(warning) = check_stock(product, line.quantity) {
            return LineChange::Rejected(warning);
        }

        line.product_id = Some(product.id.clone());
        line.product_name = product.name.clone();
        line.unit_price = pricing::resolve_unit_price(product, line.tier);
        line.unit_volume_points = pricing::volume_points(1, product);
        line.recompute();

        self.recompute_totals();
        LineChange::Applied
    }

    /// Changes the tier of a line and re-resolves its price.
    pub fn set_tier(
        &mut self,
        index: usize,
        tier: Option<Tier>,
        catalog: &[Product],
    ) -> LineChange {
        let Some(line) = self.lines.get_mut(index) else {
            return LineChange::Unchanged;
        };

        line.tier = tier;
        if let Some(product) = find_line_product(line, catalog) {
            line.unit_price = pricing::resolve_unit_price(product, tier);
            line.recompute();
        }

        self.recompute_totals();
        LineChange::Applied
    }

    /// Sets a line's quantity, checked against the product's stock.
    pub fn set_quantity(
        &mut self,
        index: usize,
        quantity: i64,
        catalog: &[Product],
    ) -> CoreResult<LineChange> {
        validate_quantity(quantity)?;

        let Some(line) = self.lines.get_mut(index) else {
            return Ok(LineChange::Unchanged);
        };
        if line.quantity == quantity {
            return Ok(LineChange::Unchanged);
        }

        if let Some(product) = find_line_product(line, catalog) {
            if let Err(warning) = check_stock(product, quantity) {
                return Ok(LineChange::Rejected(warning));
            }
        }

        line.quantity = quantity;
        line.recompute();
        self.recompute_totals();
        Ok(LineChange::Applied)
    }

    /// Steps a line's quantity by `delta`. Never goes below 1.
    pub fn step_quantity(
        &mut self,
        index: usize,
        delta: i64,
        catalog: &[Product],
    ) -> CoreResult<LineChange> {
        let Some(line) = self.lines.get(index) else {
            return Ok(LineChange::Unchanged);
        };
        let target = line.quantity.saturating_add(delta).clamp(1, MAX_ITEM_QUANTITY);
        self.set_quantity(index, target, catalog)
    }

    /// Manual unit price override. The line no longer follows a tier.
    pub fn set_price(&mut self, index: usize, price: Money) -> CoreResult<LineChange> {
        validate_price("price", price)?;

        let Some(line) = self.lines.get_mut(index) else {
            return Ok(LineChange::Unchanged);
        };

        line.unit_price = price;
        line.tier = None;
        line.recompute();

        self.recompute_totals();
        Ok(LineChange::Applied)
    }

    /// Selects the customer. An unknown id keeps the previous selection.
    pub fn select_customer(&mut self, customer_id: &str, customers: &[Customer]) -> bool {
        if customers.iter().any(|c| c.id == customer_id) {
            self.customer_id = Some(customer_id.to_string());
            true
        } else {
            false
        }
    }

    // -------------------------------------------------------------------------
    // Commit
    // -------------------------------------------------------------------------

    /// Turns the draft into an immutable [`Sale`].
    ///
    /// ## Steps
    /// 1. Customer selected and every line complete
    /// 2. Quantity summed per product and checked against current stock
    /// 3. Names snapshotted, totals frozen
    /// 4. Sale appended, stock decremented, builder reset
    ///
    /// Any error leaves both the store and the builder untouched.
    pub fn commit(&mut self, store: &mut Store, now: DateTime<Utc>) -> CoreResult<Sale> {
        let customer_id = self
            .customer_id
            .as_deref()
            .ok_or(CoreError::NoCustomerSelected)?;
        let customer = store
            .customer(customer_id)
            .ok_or(CoreError::NoCustomerSelected)?;

        let mut demand: BTreeMap<String, i64> = BTreeMap::new();
        for (position, line) in self.lines.iter().enumerate() {
            let product_id = line.product_id.as_ref().ok_or_else(|| CoreError::SaleNotReady {
                reason: format!("line {} has no product", position + 1),
            })?;
            if line.quantity <= 0 {
                return Err(ValidationError::MustBePositive {
                    field: "quantity".to_string(),
                }
                .into());
            }
            *demand.entry(product_id.clone()).or_default() += line.quantity;
        }

        stock::validate_demand(store.products(), &demand)?;

        let items: Vec<SaleLine> = self
            .lines
            .iter()
            .filter_map(|line| {
                let product_id = line.product_id.as_ref()?;
                let product_name = store
                    .product(product_id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| line.product_name.clone());
                Some(SaleLine {
                    product_id: product_id.clone(),
                    product_name,
                    quantity: line.quantity,
                    tier: line.tier,
                    unit_price: line.unit_price,
                    line_total: pricing::line_total(line.quantity, line.unit_price),
                    volume_points: line.volume_points,
                })
            })
            .collect();

        let subtotal: Money = items.iter().map(|l| l.line_total).sum();
        let sale = Sale {
            id: new_id(),
            created_at: now,
            customer_id: customer.id.clone(),
            customer_name: customer.name.clone(),
            volume_points: items.iter().map(|l| l.volume_points).sum(),
            items,
            subtotal,
            total: subtotal,
        };

        store.push_sale(sale.clone());
        stock::commit_decrement(store.products_mut(), &sale);
        self.reset();

        Ok(sale)
    }

    fn recompute_totals(&mut self) {
        let subtotal: Money = self.lines.iter().map(|l| l.line_total).sum();
        self.totals = SaleTotals {
            subtotal,
            total: subtotal,
            volume_points: self.lines.iter().map(|l| l.volume_points).sum(),
            line_count: self.lines.len(),
        };
    }
}

fn find_line_product<'a>(line: &DraftLine, catalog: &'a [Product]) -> Option<&'a Product> {
    let id = line.product_id.as_deref()?;
    catalog.iter().find(|p| p.id == id)
}

fn check_stock(product: &Product, requested: i64) -> Result<(), StockWarning> {
    stock::validate_availability(product, requested).map_err(|_| StockWarning {
        product_name: product.name.clone(),
        available: product.stock,
        requested,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
