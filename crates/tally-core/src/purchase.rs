//! # Purchase Recorder
//!
//! Records stock received from a supplier at an ad hoc cost.
//!
//! A purchase names its product in free text and is deliberately not linked
//! to the catalog: recording one never changes any product's stock or
//! prices. Restocking is done by editing the product.

use chrono::{DateTime, Utc};

use crate::error::CoreResult;
use crate::store::Store;
use crate::types::{new_id, Purchase};
use crate::validation::PurchaseInput;

/// Validates the form and appends a purchase to the store.
///
/// Nothing is stored when validation fails.
pub fn record_purchase(
    store: &mut Store,
    input: &PurchaseInput,
    now: DateTime<Utc>,
) -> CoreResult<Purchase> {
    let draft = input.validate()?;

    let purchase = Purchase {
        id: new_id(),
        created_at: now,
        total: draft.unit_cost.multiply_quantity(draft.quantity),
        product_name: draft.product_name,
        quantity: draft.quantity,
        unit_cost: draft.unit_cost,
        supplier: draft.supplier,
    };

    store.push_purchase(purchase.clone());
    Ok(purchase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};
    use crate::pricing::TierDefaults;
    use crate::test_support::product_with;

    fn form(quantity: &str, cost: &str, supplier: &str) -> PurchaseInput {
        PurchaseInput {
            product_name: "Formula 1 Vanilla".to_string(),
            quantity: quantity.to_string(),
            cost: cost.to_string(),
            supplier: supplier.to_string(),
        }
    }

    #[test]
    fn test_purchase_total_and_products_untouched() {
        let product = product_with(5000, 10, 5, 2.0);
        let mut store = Store::from_parts(
            TierDefaults::default(),
            vec![product],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        let products_before = store.products().to_vec();

        let purchase = record_purchase(&mut store, &form("5", "20", "Acme"), Utc::now()).unwrap();

        assert_eq!(purchase.total.cents(), 10_000);
        assert_eq!(purchase.supplier, "Acme");
        assert_eq!(store.purchases(), &[purchase]);
        assert_eq!(store.products(), products_before.as_slice());
    }

    #[test]
    fn test_invalid_purchase_stores_nothing() {
        let mut store = Store::default();

        let err = record_purchase(&mut store, &form("5", "20", ""), Utc::now()).unwrap_err();
        assert_eq!(
            err,
            CoreError::Validation(ValidationError::required("supplier"))
        );

        assert!(record_purchase(&mut store, &form("-2", "20", "Acme"), Utc::now()).is_err());
        assert!(record_purchase(&mut store, &form("2", "abc", "Acme"), Utc::now()).is_err());
        assert!(store.purchases().is_empty());
    }

    #[test]
    fn test_largest_allowed_purchase_total_is_exact() {
        let mut store = Store::default();

        let purchase =
            record_purchase(&mut store, &form("999", "10000000", "Acme"), Utc::now()).unwrap();
        assert_eq!(purchase.total.cents(), 999 * crate::MAX_PRICE_CENTS);

        let err = record_purchase(
            &mut store,
            &form("999", "92233720368547758.07", "Acme"),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
        assert_eq!(store.purchases().len(), 1);
    }
}
