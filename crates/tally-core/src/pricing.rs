//! # Pricing Engine
//!
//! Resolves the unit price of a sale line from a product's tier table, and
//! computes line totals, volume points and margins.
//!
//! ## Price Resolution
//! ```text
//! resolve_unit_price(product, tier)
//!      │
//!      ├── tier chosen and table entry > 0 ──► tier price
//!      │
//!      ├── reference price > 0 ──────────────► reference price
//!      │
//!      └── otherwise ────────────────────────► 0
//! ```
//!
//! Nothing here fails: a missing or unusable tier falls back, it never errors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Product, Tier, TierTable};
use crate::validation::{parse_percent_bps, ValidationResult};

// =============================================================================
// Tier Defaults
// =============================================================================

/// Percent-of-reference table used to backfill missing tier prices.
///
/// Stored in basis points: 7500 = 75% of the reference price.
///
/// ## Default Table
/// | Tier | Share of reference |
/// |------|--------------------|
/// | 25   | 75%                |
/// | 35   | 65%                |
/// | 42   | 58%                |
/// | 50   | 50%                |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDefaults {
    bps: BTreeMap<Tier, u32>,
}

impl Default for TierDefaults {
    fn default() -> Self {
        TierDefaults {
            bps: Tier::ALL
                .into_iter()
                .map(|tier| (tier, 10_000 - tier_discount_bps(tier)))
                .collect(),
        }
    }
}

/// The discount a tier label stands for (tier "42" = 4200 bps off).
const fn tier_discount_bps(tier: Tier) -> u32 {
    match tier {
        Tier::T25 => 2500,
        Tier::T35 => 3500,
        Tier::T42 => 4200,
        Tier::T50 => 5000,
    }
}

impl TierDefaults {
    /// Share of the reference price for `tier`, in basis points.
    pub fn share_bps(&self, tier: Tier) -> u32 {
        self.bps
            .get(&tier)
            .copied()
            .unwrap_or_else(|| 10_000 - tier_discount_bps(tier))
    }

    /// Overrides the share for one tier.
    pub fn with_share(mut self, tier: Tier, bps: u32) -> Self {
        self.bps.insert(tier, bps);
        self
    }

    /// Parses overrides such as `"25=75,42=57.5"` on top of the defaults.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::pricing::TierDefaults;
    /// use tally_core::Tier;
    ///
    /// let defaults = TierDefaults::parse("42=60").unwrap();
    /// assert_eq!(defaults.share_bps(Tier::T42), 6000);
    /// assert_eq!(defaults.share_bps(Tier::T25), 7500);
    /// ```
    pub fn parse(spec: &str) -> ValidationResult<Self> {
        let mut defaults = TierDefaults::default();

        for pair in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (label, percent) = pair.split_once('=').ok_or_else(|| {
                ValidationError::invalid_format("tier defaults", "expected <tier>=<percent>")
            })?;

            let tier = Tier::from_label(label).ok_or_else(|| ValidationError::NotAllowed {
                field: "tier".to_string(),
                allowed: Tier::labels(),
            })?;

            let bps = parse_percent_bps("tier defaults", percent)?;
            defaults = defaults.with_share(tier, bps);
        }

        Ok(defaults)
    }

    /// Builds a complete table from possibly-partial entries.
    ///
    /// Entries that are missing or zero become `reference × share(tier)`.
    pub fn backfill(
        &self,
        reference: Money,
        mut entry: impl FnMut(Tier) -> Option<Money>,
    ) -> TierTable {
        TierTable::from_fn(|tier| match entry(tier) {
            Some(price) if price.is_positive() => price,
            _ => reference.percent_of(self.share_bps(tier)),
        })
    }
}

// =============================================================================
// Price Resolution
// =============================================================================

/// Resolves the unit price of `product` at `tier`.
///
/// ## Example
/// ```rust,ignore
/// // ref 50.00, tier 42 = 29.00
/// assert_eq!(resolve_unit_price(&product, Some(Tier::T42)).cents(), 2900);
/// // no tier chosen: list price
/// assert_eq!(resolve_unit_price(&product, None).cents(), 5000);
/// ```
pub fn resolve_unit_price(product: &Product, tier: Option<Tier>) -> Money {
    if let Some(tier) = tier {
        let price = product.tiers.get(tier);
        if price.is_positive() {
            return price;
        }
    }

    if product.reference_price.is_positive() {
        product.reference_price
    } else {
        Money::zero()
    }
}

/// quantity × unit price.
#[inline]
pub fn line_total(quantity: i64, unit_price: Money) -> Money {
    unit_price.multiply_quantity(quantity)
}

/// quantity × the product's volume-point weight.
#[inline]
pub fn volume_points(quantity: i64, product: &Product) -> f64 {
    if product.volume_points.is_finite() && product.volume_points > 0.0 {
        quantity as f64 * product.volume_points
    } else {
        0.0
    }
}

/// Margin of `price` below `reference`, in percent.
///
/// Returns `0.0` when the reference is zero rather than dividing by it.
pub fn margin_percent(reference: Money, price: Money) -> f64 {
    if reference.is_zero() {
        return 0.0;
    }
    (reference - price).cents() as f64 / reference.cents() as f64 * 100.0
}

/// One row of a product's price listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TierMargin {
    pub tier: Tier,
    pub price: Money,
    pub margin_percent: f64,
}

/// Per-tier prices and margins for read-only product listings.
pub fn tier_margins(product: &Product) -> Vec<TierMargin> {
    product
        .tiers
        .entries()
        .into_iter()
        .map(|(tier, price)| TierMargin {
            tier,
            price,
            margin_percent: margin_percent(product.reference_price, price),
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::product_with;

    #[test]
    fn test_resolves_tier_price() {
        let product = product_with(5000, 10, 5, 2.0);
        assert_eq!(resolve_unit_price(&product, Some(Tier::T42)).cents(), 2900);
        assert_eq!(resolve_unit_price(&product, Some(Tier::T25)).cents(), 3750);
    }

    #[test]
    fn test_no_tier_uses_reference() {
        let product = product_with(5000, 10, 5, 2.0);
        assert_eq!(resolve_unit_price(&product, None).cents(), 5000);
    }

    #[test]
    fn test_zero_tier_entry_falls_back_to_reference() {
        let mut product = product_with(5000, 10, 5, 2.0);
        product.tiers = TierTable::from_fn(|tier| match tier {
            Tier::T42 => Money::zero(),
            _ => Money::from_cents(4000),
        });
        assert_eq!(resolve_unit_price(&product, Some(Tier::T42)).cents(), 5000);
    }

    #[test]
    fn test_nothing_priced_resolves_to_zero() {
        let mut product = product_with(0, 10, 5, 2.0);
        product.tiers = TierTable::default();
        for tier in Tier::ALL {
            assert_eq!(resolve_unit_price(&product, Some(tier)), Money::zero());
        }
        assert_eq!(resolve_unit_price(&product, None), Money::zero());
    }

    #[test]
    fn test_line_total_and_points() {
        let product = product_with(5000, 10, 5, 2.0);
        assert_eq!(line_total(3, Money::from_cents(2900)).cents(), 8700);
        assert_eq!(volume_points(3, &product), 6.0);

        let plain = product_with(5000, 10, 5, 0.0);
        assert_eq!(volume_points(3, &plain), 0.0);
    }

    #[test]
    fn test_margin_percent() {
        let reference = Money::from_cents(5000);
        assert!((margin_percent(reference, Money::from_cents(2900)) - 42.0).abs() < 1e-9);
        assert_eq!(margin_percent(Money::zero(), Money::from_cents(2900)), 0.0);
    }

    #[test]
    fn test_tier_margins_listing() {
        let product = product_with(5000, 10, 5, 2.0);
        let margins = tier_margins(&product);
        assert_eq!(margins.len(), 4);
        assert_eq!(margins[0].tier, Tier::T25);
        assert!((margins[3].margin_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_backfill_matches_tier_labels() {
        let defaults = TierDefaults::default();
        let table = defaults.backfill(Money::from_cents(5000), |_| None);
        assert_eq!(table.get(Tier::T25).cents(), 3750);
        assert_eq!(table.get(Tier::T35).cents(), 3250);
        assert_eq!(table.get(Tier::T42).cents(), 2900);
        assert_eq!(table.get(Tier::T50).cents(), 2500);
    }

    #[test]
    fn test_backfill_keeps_explicit_entries() {
        let defaults = TierDefaults::default();
        let table = defaults.backfill(Money::from_cents(5000), |tier| match tier {
            Tier::T42 => Some(Money::from_cents(3100)),
            Tier::T50 => Some(Money::zero()),
            _ => None,
        });
        assert_eq!(table.get(Tier::T42).cents(), 3100);
        assert_eq!(table.get(Tier::T50).cents(), 2500);
    }

    #[test]
    fn test_parse_overrides() {
        let defaults = TierDefaults::parse("25=80, 50=45.5").unwrap();
        assert_eq!(defaults.share_bps(Tier::T25), 8000);
        assert_eq!(defaults.share_bps(Tier::T50), 4550);
        assert_eq!(defaults.share_bps(Tier::T35), 6500);

        assert!(TierDefaults::parse("30=70").is_err());
        assert!(TierDefaults::parse("25").is_err());
        assert!(TierDefaults::parse("25=abc").is_err());
        assert_eq!(TierDefaults::parse("").unwrap(), TierDefaults::default());
    }
}
