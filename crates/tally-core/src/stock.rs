//! # Stock Ledger
//!
//! Availability checks, stock classification and the sale-commit decrement.
//!
//! ## Stock Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Quantity change on a draft line                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_availability(product, qty)  ── qty > stock ──► rejected       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleBuilder::commit                                                    │
//! │       │  validate_demand (Σ qty per product across lines)               │
//! │       ▼                                                                 │
//! │  commit_decrement(products, sale) ◄── the ONLY downward path for a sale │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{Product, Sale};

// =============================================================================
// Stock Status
// =============================================================================

/// Stock classification shown on listings and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

impl StockStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "Out of Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::InStock => "In Stock",
        }
    }
}

/// Classifies a product's stock level.
///
/// Zero stock is always `OutOfStock`, even when `min_stock` is also zero.
pub fn classify(product: &Product) -> StockStatus {
    if product.stock <= 0 {
        StockStatus::OutOfStock
    } else if product.stock <= product.min_stock {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

/// Whether the product is at or below its reorder threshold (out or low).
#[inline]
pub fn needs_reorder(product: &Product) -> bool {
    classify(product) != StockStatus::InStock
}

// =============================================================================
// Availability
// =============================================================================

/// Checks that `requested` units can be taken from current stock.
pub fn validate_availability(product: &Product, requested: i64) -> CoreResult<()> {
    if requested > product.stock {
        return Err(CoreError::InsufficientStock {
            product: product.name.clone(),
            available: product.stock,
            requested,
        });
    }
    Ok(())
}

/// Checks an aggregated per-product demand against the catalog.
///
/// Two lines for the same product are summed before the comparison, so a
/// sale can never take more than is on hand in total.
pub fn validate_demand(products: &[Product], demand: &BTreeMap<String, i64>) -> CoreResult<()> {
    for (product_id, requested) in demand {
        let product = products
            .iter()
            .find(|p| &p.id == product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.clone()))?;
        validate_availability(product, *requested)?;
    }
    Ok(())
}

// =============================================================================
// Commit
// =============================================================================

/// Decrements stock for every line of a committed sale.
///
/// Unconditional: availability was validated before the sale was built.
/// Lines whose product has since been deleted are skipped.
///
/// ## Returns
/// The number of lines applied.
pub fn commit_decrement(products: &mut [Product], sale: &Sale) -> usize {
    let mut applied = 0;
    for line in &sale.items {
        if let Some(product) = products.iter_mut().find(|p| p.id == line.product_id) {
            product.stock -= line.quantity;
            applied += 1;
        }
    }
    applied
}

// =============================================================================
// Unit Tests
// =============================================================================
