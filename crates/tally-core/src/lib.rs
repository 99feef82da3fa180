//! # tally-core: Pricing and Stock Ledger for Tally POS
//!
//! This crate is the **heart** of Tally POS. It holds the catalog, prices
//! sale lines from tier tables, validates and decrements stock, and builds
//! the reports, all as plain synchronous code with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend                                     │   │
//! │  │    Products ──► Sale form ──► Purchases ──► Reports             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON lines (stdin/stdout)              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-bridge commands                        │   │
//! │  │    save_product, set_line_tier, complete_sale, dashboard ...    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  pricing  │  │   stock   │  │  builder  │  │  report   │  │   │
//! │  │   │ TierTable │  │ classify  │  │SaleBuilder│  │ Dashboard │  │   │
//! │  │   │  margins  │  │ decrement │  │  commit   │  │ StockRpt  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO LOGGING • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (Persistence)                       │   │
//! │  │          SQLite key-value documents, one per collection         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, Customer, Sale, Purchase)
//! - [`money`] - Money type with integer arithmetic
//! - [`pricing`] - Tier price resolution, backfill defaults, margins
//! - [`stock`] - Availability checks, classification, commit decrement
//! - [`builder`] - The sale being built and its commit
//! - [`purchase`] - Supplier purchases
//! - [`report`] - Dashboard, daily sales, stock report, search
//! - [`store`] - Owner of the four collections
//! - [`validation`] - Form input parsing (the only place decimals are parsed)
//! - [`migrate`] - Stored document format and legacy upgrade
//! - [`receipt`] - Text invoices, bill messages, message links
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use tally_core::builder::SaleBuilder;
//! use tally_core::store::Store;
//! use tally_core::{Tier, TierDefaults};
//!
//! let mut store = Store::new(TierDefaults::default());
//! store.seed_sample_data(Utc::now());
//!
//! let product_id = store.products()[0].id.clone();
//! let customer_id = store.customers()[0].id.clone();
//!
//! let mut builder = SaleBuilder::new();
//! builder.set_product(0, &product_id, store.products());
//! builder.set_tier(0, Some(Tier::T42), store.products());
//! builder.select_customer(&customer_id, store.customers());
//!
//! let sale = builder.commit(&mut store, Utc::now()).unwrap();
//! assert_eq!(sale.total, sale.subtotal);
//! assert_eq!(store.products()[0].stock, 24);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod builder;
pub mod error;
pub mod migrate;
pub mod money;
pub mod pricing;
pub mod purchase;
pub mod receipt;
pub mod report;
pub mod sample;
pub mod stock;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use builder::{
    BuilderState, DraftLine, LineChange, SaleBuilder, SaleDraft, SaleTotals, StockWarning,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::TierDefaults;
pub use stock::StockStatus;
pub use store::{Collection, Store};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single sale
///
/// ## Business Reason
/// Prevents runaway drafts and keeps invoices printable.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity of a single line
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum stock count or threshold a product form accepts
pub const MAX_STOCK: i64 = 1_000_000;

/// Maximum unit price or cost a form accepts, in minor units (10,000,000.00)
///
/// With [`MAX_STOCK`] this keeps every inventory value far inside i64.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;
