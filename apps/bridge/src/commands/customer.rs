//! # Customer Commands

use chrono::Utc;
use serde::Deserialize;
use tally_core::validation::CustomerInput;
use tally_core::{Collection, Customer};
use tracing::{debug, info};

use super::{Deleted, IdArgs, Saved};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct SaveCustomerArgs {
    /// `None` creates a new customer.
    #[serde(default)]
    pub id: Option<String>,
    pub input: CustomerInput,
}

pub fn list_customers(app: &AppState) -> &[Customer] {
    debug!("list_customers command");
    app.store.customers()
}

/// Creates or updates a customer from raw form input.
pub async fn save_customer(
    app: &mut AppState,
    args: SaveCustomerArgs,
) -> Result<Saved<Customer>, ApiError> {
    let draft = args.input.validate()?;
    let now = Utc::now();

    let saved = match args.id {
        None => Some(app.store.add_customer(draft, now)),
        Some(id) => app.store.update_customer(&id, draft, now),
    };

    let Some(customer) = saved else {
        return Ok(Saved::stale());
    };

    info!(id = %customer.id, "Customer saved");
    app.persist(&[Collection::Customers]).await;
    Ok(Saved::found(customer))
}

/// Deletes a customer. Their past sales keep the frozen name.
pub async fn delete_customer(app: &mut AppState, args: IdArgs) -> Deleted {
    let found = app.store.delete_customer(&args.id);
    if found {
        info!(id = %args.id, "Customer deleted");
        app.persist(&[Collection::Customers]).await;
    }
    Deleted { found }
}

#[cfg(test)]
mod tests {
    use crate::commands::dispatch;
    use crate::test_support::seeded_state;
    use serde_json::json;

    #[tokio::test]
    async fn test_customer_lifecycle() {
        let (mut app, _kv) = seeded_state().await;

        let saved = dispatch(
            &mut app,
            "save_customer",
            json!({
                "input": {
                    "name": "Ravi Kumar",
                    "phone": "+91 98765 43210",
                    "discountPercent": "35"
                }
            }),
        )
        .await
        .unwrap();
        assert_eq!(saved["found"], true);
        assert_eq!(saved["record"]["discountPercent"], 35.0);
        let id = saved["record"]["id"].as_str().unwrap().to_string();

        let renamed = dispatch(
            &mut app,
            "save_customer",
            json!({"id": id, "input": {"name": "Ravi K."}}),
        )
        .await
        .unwrap();
        assert_eq!(renamed["record"]["name"], "Ravi K.");
        assert_eq!(app.store.customers().len(), 4);

        let deleted = dispatch(&mut app, "delete_customer", json!({ "id": id }))
            .await
            .unwrap();
        assert_eq!(deleted["found"], true);
        assert_eq!(app.store.customers().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_name_is_validation_error() {
        let (mut app, _kv) = seeded_state().await;

        let err = dispatch(&mut app, "save_customer", json!({"input": {"email": "a@b.c"}}))
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
    }
}
