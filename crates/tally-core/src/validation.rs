//! # Validation Module
//!
//! The single place where raw form input becomes typed values.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend                                                      │
//! │  ├── Form fields arrive as raw strings ("37.5", "", "12")               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── ProductInput / CustomerInput / PurchaseInput ──► *Draft            │
//! │  ├── Decimal strings ──► Money (minor units)                            │
//! │  └── Defaults applied (empty volume points = 0, tiers backfilled)       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Store / SaleBuilder                                           │
//! │  └── Only ever sees already-validated numeric types                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::pricing::TierDefaults;
use crate::types::{Tier, TierTable};
use crate::{MAX_ITEM_QUANTITY, MAX_PRICE_CENTS, MAX_STOCK};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_TEXT_LEN: usize = 1000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Formula 1 Vanilla").is_ok());
/// assert!(validate_product_name("  ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required_text("name", name, MAX_NAME_LEN).map(|_| ())
}

/// Trims `value` and rejects it when empty or longer than `max` characters.
pub fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    optional_text(field, value, max)
}

/// Trims `value` and rejects it only when longer than `max` characters.
pub fn optional_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (matches everything)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed, lower-cased query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = optional_text("query", query, 100)?;
    Ok(query.to_lowercase())
}

// =============================================================================
// Numeric Parsers
// =============================================================================

/// Parses a non-negative decimal amount.
///
/// ## Example
/// ```rust
/// use tally_core::validation::parse_money;
///
/// assert_eq!(parse_money("price", "37.5").unwrap().cents(), 3750);
/// assert!(parse_money("price", "-1").is_err());
/// assert!(parse_money("price", "").is_err());
/// ```
pub fn parse_money(field: &str, raw: &str) -> ValidationResult<Money> {
    if raw.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    let money = Money::from_decimal_str(raw).ok_or_else(|| {
        ValidationError::invalid_format(field, "must be a number with at most 2 decimals")
    })?;

    validate_price(field, money)?;
    Ok(money)
}

/// Parses a strictly positive decimal amount.
pub fn parse_positive_money(field: &str, raw: &str) -> ValidationResult<Money> {
    let money = parse_money(field, raw)?;
    if !money.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(money)
}

/// Rejects negative amounts and anything above `MAX_PRICE_CENTS`. Zero is
/// allowed.
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    if price.cents() > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS / 100,
        });
    }
    Ok(())
}

/// Parses a required whole number in `0..=MAX_STOCK` (stock, thresholds).
pub fn parse_count(field: &str, raw: &str) -> ValidationResult<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::required(field));
    }

    let value: i64 = raw
        .parse()
        .map_err(|_| ValidationError::invalid_format(field, "must be a whole number"))?;

    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    if value > MAX_STOCK {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_STOCK,
        });
    }

    Ok(value)
}

/// Parses a required sale or purchase quantity.
pub fn parse_quantity(field: &str, raw: &str) -> ValidationResult<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::required(field));
    }

    let qty: i64 = raw
        .parse()
        .map_err(|_| ValidationError::invalid_format(field, "must be a whole number"))?;

    validate_quantity(qty)?;
    Ok(qty)
}

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Parses an optional non-negative weight; empty input is 0.
pub fn parse_points(field: &str, raw: &str) -> ValidationResult<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }

    let value: f64 = raw
        .parse()
        .map_err(|_| ValidationError::invalid_format(field, "must be a number"))?;

    if !value.is_finite() {
        return Err(ValidationError::invalid_format(field, "must be a number"));
    }
    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(value)
}

/// Parses a percentage (`"58"`, `"57.5"`) into basis points, 0-100%.
pub fn parse_percent_bps(field: &str, raw: &str) -> ValidationResult<u32> {
    // Two-decimal percent strings map 1:1 onto basis points.
    let hundredths = Money::from_decimal_str(raw)
        .ok_or_else(|| ValidationError::invalid_format(field, "must be a percentage"))?
        .cents();

    if !(0..=10_000).contains(&hundredths) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(hundredths as u32)
}

// =============================================================================
// Product Form
// =============================================================================

/// Raw product form as submitted by the frontend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub description: String,
    /// Maximum retail price.
    pub reference_price: String,
    pub stock: String,
    pub min_stock: String,
    pub volume_points: String,
    /// Tier label → price. Missing or empty entries are backfilled.
    pub tiers: BTreeMap<String, String>,
}

/// A validated product form.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub description: String,
    pub reference_price: Money,
    pub stock: i64,
    pub min_stock: i64,
    pub volume_points: f64,
    pub tiers: TierTable,
}

impl ProductInput {
    /// Validates every field and builds a complete tier table.
    pub fn validate(&self, defaults: &TierDefaults) -> ValidationResult<ProductDraft> {
        let name = required_text("name", &self.name, MAX_NAME_LEN)?;
        let category = required_text("category", &self.category, MAX_NAME_LEN)?;
        let description = optional_text("description", &self.description, MAX_TEXT_LEN)?;
        let reference_price = parse_money("reference price", &self.reference_price)?;
        let stock = parse_count("stock", &self.stock)?;
        let min_stock = parse_count("minimum stock", &self.min_stock)?;
        let volume_points = parse_points("volume points", &self.volume_points)?;

        let mut entries: BTreeMap<Tier, Money> = BTreeMap::new();
        for (label, raw) in &self.tiers {
            let tier = Tier::from_label(label).ok_or_else(|| ValidationError::NotAllowed {
                field: "tier".to_string(),
                allowed: Tier::labels(),
            })?;

            if raw.trim().is_empty() {
                continue;
            }
            let field = format!("tier {} price", tier.label());
            entries.insert(tier, parse_money(&field, raw)?);
        }

        let tiers = defaults.backfill(reference_price, |tier| entries.get(&tier).copied());

        Ok(ProductDraft {
            name,
            category,
            description,
            reference_price,
            stock,
            min_stock,
            volume_points,
            tiers,
        })
    }
}

// =============================================================================
// Customer Form
// =============================================================================

/// Raw customer form as submitted by the frontend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub discount_percent: String,
}

/// A validated customer form.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub discount_percent: f64,
}

impl CustomerInput {
    pub fn validate(&self) -> ValidationResult<CustomerDraft> {
        let discount_percent = if self.discount_percent.trim().is_empty() {
            0.0
        } else {
            parse_percent_bps("discount", &self.discount_percent)? as f64 / 100.0
        };

        Ok(CustomerDraft {
            name: required_text("name", &self.name, MAX_NAME_LEN)?,
            email: optional_text("email", &self.email, MAX_NAME_LEN)?,
            phone: optional_text("phone", &self.phone, 50)?,
            address: optional_text("address", &self.address, MAX_TEXT_LEN)?,
            discount_percent,
        })
    }
}

// =============================================================================
// Purchase Form
// =============================================================================

/// Raw purchase form as submitted by the frontend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseInput {
    pub product_name: String,
    pub quantity: String,
    pub cost: String,
    pub supplier: String,
}

/// A validated purchase form.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseDraft {
    pub product_name: String,
    pub quantity: i64,
    pub unit_cost: Money,
    pub supplier: String,
}

impl PurchaseInput {
    /// All four fields are required; quantity and cost must be positive.
    pub fn validate(&self) -> ValidationResult<PurchaseDraft> {
        let product_name = required_text("product name", &self.product_name, MAX_NAME_LEN)?;
        let quantity = parse_quantity("quantity", &self.quantity)?;
        let unit_cost = parse_positive_money("cost", &self.cost)?;
        let supplier = required_text("supplier", &self.supplier, MAX_NAME_LEN)?;

        Ok(PurchaseDraft {
            product_name,
            quantity,
            unit_cost,
            supplier,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
