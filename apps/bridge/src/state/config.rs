//! # Bridge Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`TALLY_*`)
//! 2. Defaults (this file)
//!
//! | Variable                 | Default                          |
//! |--------------------------|----------------------------------|
//! | `TALLY_DB_PATH`          | platform data dir + `tally.db`   |
//! | `TALLY_STORE_NAME`       | `Gratitude Nutrition Club`       |
//! | `TALLY_CURRENCY_SYMBOL`  | `₹`                              |
//! | `TALLY_KEY_PREFIX`       | `tally_`                         |
//! | `TALLY_TIER_DEFAULTS`    | `25=75,35=65,42=58,50=50`        |
//! | `TALLY_DEFAULT_TIER`     | none (list price)                |
//! | `TALLY_SEED_SAMPLE_DATA` | `true`                           |
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex of its own.

use directories::ProjectDirs;
use std::path::PathBuf;
use tally_core::receipt::InvoiceLayout;
use tally_core::{Tier, TierDefaults};
use tally_db::DEFAULT_KEY_PREFIX;

use crate::error::BridgeError;

/// Bridge configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// Explicit database file. `None` means the platform data directory.
    pub db_path: Option<PathBuf>,

    /// Business name on invoices and bill messages
    pub store_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Prefix of the persisted collection keys
    pub key_prefix: String,

    /// Shares used to backfill missing tier prices
    pub tier_defaults: TierDefaults,

    /// Tier preselected on new sale lines
    pub default_tier: Option<Tier>,

    /// Load the sample catalog when products and customers are both empty
    pub seed_sample_data: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let layout = InvoiceLayout::default();
        BridgeConfig {
            db_path: None,
            store_name: layout.store_name,
            currency_symbol: layout.currency_symbol,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            tier_defaults: TierDefaults::default(),
            default_tier: None,
            seed_sample_data: true,
        }
    }
}

impl BridgeConfig {
    /// Creates a config from environment variables and defaults.
    pub fn from_env() -> Result<Self, BridgeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BridgeError> {
        let mut config = BridgeConfig::default();

        if let Some(path) = lookup("TALLY_DB_PATH").filter(|p| !p.trim().is_empty()) {
            config.db_path = Some(PathBuf::from(path));
        }

        if let Some(store_name) = lookup("TALLY_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Some(symbol) = lookup("TALLY_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(prefix) = lookup("TALLY_KEY_PREFIX") {
            config.key_prefix = prefix;
        }

        if let Some(spec) = lookup("TALLY_TIER_DEFAULTS") {
            config.tier_defaults = TierDefaults::parse(&spec)
                .map_err(|e| BridgeError::Config(format!("TALLY_TIER_DEFAULTS: {}", e)))?;
        }

        if let Some(label) = lookup("TALLY_DEFAULT_TIER").filter(|l| !l.trim().is_empty()) {
            let tier = Tier::from_label(&label).ok_or_else(|| {
                BridgeError::Config(format!("TALLY_DEFAULT_TIER: unknown tier '{}'", label))
            })?;
            config.default_tier = Some(tier);
        }

        if let Some(flag) = lookup("TALLY_SEED_SAMPLE_DATA") {
            config.seed_sample_data = parse_flag(&flag);
        }

        Ok(config)
    }

    /// Resolves the database file, creating the data directory if needed.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.tally.pos/tally.db`
    /// - **Windows**: `%APPDATA%\tally\pos\data\tally.db`
    /// - **Linux**: `~/.local/share/pos/tally.db`
    pub fn database_path(&self) -> Result<PathBuf, BridgeError> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }

        let proj_dirs = ProjectDirs::from("com", "tally", "pos")
            .ok_or_else(|| BridgeError::Config("Could not determine app data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join("tally.db"))
    }

    /// Invoice layout carrying this store's name and currency.
    pub fn invoice_layout(&self) -> InvoiceLayout {
        InvoiceLayout {
            store_name: self.store_name.clone(),
            currency_symbol: self.currency_symbol.clone(),
            ..InvoiceLayout::default()
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.key_prefix, "tally_");
        assert!(config.seed_sample_data);
        assert_eq!(config.default_tier, None);
    }

    #[test]
    fn test_overrides() {
        let config = BridgeConfig::from_lookup(lookup(&[
            ("TALLY_DB_PATH", "/tmp/shop.db"),
            ("TALLY_STORE_NAME", "Corner Shop"),
            ("TALLY_CURRENCY_SYMBOL", "$"),
            ("TALLY_KEY_PREFIX", "shop_"),
            ("TALLY_TIER_DEFAULTS", "42=60"),
            ("TALLY_DEFAULT_TIER", "35"),
            ("TALLY_SEED_SAMPLE_DATA", "no"),
        ]))
        .unwrap();

        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.store_name, "Corner Shop");
        assert_eq!(config.key_prefix, "shop_");
        assert_eq!(config.tier_defaults.share_bps(Tier::T42), 6000);
        assert_eq!(config.default_tier, Some(Tier::T35));
        assert!(!config.seed_sample_data);
        let layout = config.invoice_layout();
        assert_eq!(layout.store_name, "Corner Shop");
        assert_eq!(layout.currency_symbol, "$");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            BridgeConfig::from_lookup(lookup(&[("TALLY_TIER_DEFAULTS", "42")])),
            Err(BridgeError::Config(_))
        ));
        assert!(matches!(
            BridgeConfig::from_lookup(lookup(&[("TALLY_DEFAULT_TIER", "30")])),
            Err(BridgeError::Config(_))
        ));
    }
}
