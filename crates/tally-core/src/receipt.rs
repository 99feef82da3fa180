//! # Receipts and Bill Messages
//!
//! Turns finalized [`Sale`]s and [`Purchase`]s into text for customers and
//! suppliers. Only committed records are ever rendered; the draft sale is
//! not a valid input.
//!
//! ## Sale Invoice Layout
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │ Gratitude Nutrition Club                                       │
//! │ Sales Invoice                                                  │
//! │ Invoice #: 7f3c...                                             │
//! │ Date: 2024-03-01                                               │
//! │ Customer: Sarah Johnson                                        │
//! │ -------------------------------------------------------------- │
//! │ Product                        Qty       Price        Total    │
//! │ Formula 1 Vanilla                3      ₹29.00       ₹87.00    │
//! │ Discount Applied: 10%                                          │
//! │ -------------------------------------------------------------- │
//! │                                      Subtotal:       ₹87.00    │
//! │                                         Total:       ₹87.00    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The discount line appears only when the customer has a discount.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Purchase, Sale};
use crate::validation::ValidationResult;

const MESSAGE_BASE_URL: &str = "https://wa.me/";

// =============================================================================
// Layout
// =============================================================================

/// Fixed-width layout for text invoices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLayout {
    /// Business name printed in the header.
    pub store_name: String,
    pub currency_symbol: String,
    /// Longer product names are cut to this many characters.
    pub name_width: usize,
    pub qty_width: usize,
    pub amount_width: usize,
}

impl Default for InvoiceLayout {
    fn default() -> Self {
        InvoiceLayout {
            store_name: "Gratitude Nutrition Club".to_string(),
            currency_symbol: "₹".to_string(),
            name_width: 25,
            qty_width: 6,
            amount_width: 12,
        }
    }
}

impl InvoiceLayout {
    fn line_width(&self) -> usize {
        self.name_width + self.qty_width + 2 * self.amount_width
    }

    fn money(&self, amount: Money) -> String {
        amount.format_with(&self.currency_symbol)
    }

    fn rule(&self) -> String {
        "-".repeat(self.line_width())
    }

    fn row(&self, name: &str, qty: &str, price: &str, total: &str) -> String {
        format!(
            "{:<name_w$}{:>qty_w$}{:>amt_w$}{:>amt_w$}",
            truncate(name, self.name_width),
            qty,
            price,
            total,
            name_w = self.name_width,
            qty_w = self.qty_width,
            amt_w = self.amount_width,
        )
    }

    fn total_row(&self, label: &str, amount: Money) -> String {
        let label_w = self.name_width + self.qty_width + self.amount_width;
        format!(
            "{:>label_w$}{:>amt_w$}",
            format!("{label}:"),
            self.money(amount),
            amt_w = self.amount_width,
        )
    }

    fn header(&self, title: &str, id: &str, date: &str, counterparty: (&str, &str)) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.store_name);
        let _ = writeln!(out, "{title}");
        let _ = writeln!(out, "Invoice #: {id}");
        let _ = writeln!(out, "Date: {date}");
        let _ = writeln!(out, "{}: {}", counterparty.0, counterparty.1);
        let _ = writeln!(out, "{}", self.rule());
        out
    }
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

// =============================================================================
// Invoices
// =============================================================================

/// Renders a sale invoice.
///
/// `discount_percent` is the customer's current discount. It is printed
/// only, never applied: the sale's totals are already final.
pub fn render_sale_invoice(sale: &Sale, discount_percent: f64, layout: &InvoiceLayout) -> String {
    let date = sale.created_at.format("%Y-%m-%d").to_string();
    let mut out = layout.header(
        "Sales Invoice",
        &sale.id,
        &date,
        ("Customer", &sale.customer_name),
    );

    let _ = writeln!(out, "{}", layout.row("Product", "Qty", "Price", "Total"));
    for item in &sale.items {
        let _ = writeln!(
            out,
            "{}",
            layout.row(
                &item.product_name,
                &item.quantity.to_string(),
                &layout.money(item.unit_price),
                &layout.money(item.line_total),
            )
        );
    }
    if discount_percent > 0.0 {
        let _ = writeln!(out, "Discount Applied: {discount_percent}%");
    }

    let _ = writeln!(out, "{}", layout.rule());
    let _ = writeln!(out, "{}", layout.total_row("Subtotal", sale.subtotal));
    let _ = writeln!(out, "{}", layout.total_row("Total", sale.total));
    out
}

pub fn render_purchase_invoice(purchase: &Purchase, layout: &InvoiceLayout) -> String {
    let date = purchase.created_at.format("%Y-%m-%d").to_string();
    let mut out = layout.header(
        "Purchase Invoice",
        &purchase.id,
        &date,
        ("Supplier", &purchase.supplier),
    );

    let _ = writeln!(out, "{}", layout.row("Product", "Qty", "Cost", "Total"));
    let _ = writeln!(
        out,
        "{}",
        layout.row(
            &purchase.product_name,
            &purchase.quantity.to_string(),
            &layout.money(purchase.unit_cost),
            &layout.money(purchase.total),
        )
    );

    let _ = writeln!(out, "{}", layout.rule());
    let _ = writeln!(out, "{}", layout.total_row("Total", purchase.total));
    out
}

/// Suggested file name for an exported invoice.
pub fn invoice_file_name(kind: &str, id: &str) -> String {
    format!("{kind}-invoice-{id}.txt")
}

// =============================================================================
// Messages
// =============================================================================

/// Plain-text bill sent to the customer after a sale.
pub fn bill_message(sale: &Sale, billing_name: &str, currency_symbol: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{billing_name} Invoice");
    let _ = writeln!(out);
    let _ = writeln!(out, "Dear {},", sale.customer_name);
    let _ = writeln!(out, "Thank you for your purchase!");
    let _ = writeln!(out);
    let _ = writeln!(out, "Order Details:");
    for item in &sale.items {
        let _ = writeln!(
            out,
            "{} x{} - {}",
            item.product_name,
            item.quantity,
            item.line_total.format_with(currency_symbol)
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Total Amount: {}",
        sale.total.format_with(currency_symbol)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "We appreciate your business.");
    let _ = write!(out, "{billing_name}");
    out
}

/// Builds a click-to-chat link carrying `text` to `phone`.
///
/// Only the digits of `phone` are kept (`"+1 (555) 123-4567"` →
/// `15551234567`).
pub fn message_link(phone: &str, text: &str) -> ValidationResult<String> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(ValidationError::required("phone"));
    }

    Ok(format!(
        "{MESSAGE_BASE_URL}{digits}?text={}",
        utf8_percent_encode(text, NON_ALPHANUMERIC)
    ))
}

// =============================================================================
// Unit Tests
// =============================================================================
