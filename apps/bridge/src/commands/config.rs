//! # Config Commands
//!
//! Configuration retrieval and the clear-all-data action.

use serde::Serialize;
use std::collections::BTreeMap;
use tally_core::{Tier, MAX_ITEM_QUANTITY, MAX_SALE_LINES};
use tracing::{debug, warn};

use super::COMMANDS;
use crate::error::ApiError;
use crate::state::AppState;

/// What the frontend needs to know about this session's configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    pub store_name: String,
    pub currency_symbol: String,
    pub key_prefix: String,
    pub default_tier: Option<Tier>,
    /// Tier label → backfill share of the reference price, in percent.
    pub tier_shares: BTreeMap<Tier, f64>,
    pub max_sale_lines: usize,
    pub max_item_quantity: i64,
    pub commands: &'static [&'static str],
}

/// Gets the current configuration.
///
/// ## When Used
/// - App startup (to configure the UI)
/// - Price formatting and the tier selector
pub fn get_config(app: &AppState) -> ConfigView {
    debug!("get_config command");
    let config = &app.config;

    ConfigView {
        store_name: config.store_name.clone(),
        currency_symbol: config.currency_symbol.clone(),
        key_prefix: config.key_prefix.clone(),
        default_tier: config.default_tier,
        tier_shares: Tier::ALL
            .into_iter()
            .map(|tier| (tier, config.tier_defaults.share_bps(tier) as f64 / 100.0))
            .collect(),
        max_sale_lines: MAX_SALE_LINES,
        max_item_quantity: MAX_ITEM_QUANTITY,
        commands: COMMANDS,
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Cleared {
    pub cleared: bool,
}

/// Deletes every product, customer, sale and purchase.
///
/// The frontend asks for confirmation first; this command does not.
pub async fn clear_all_data(app: &mut AppState) -> Result<Cleared, ApiError> {
    warn!("clear_all_data command");
    app.clear_all().await?;
    Ok(Cleared { cleared: true })
}
