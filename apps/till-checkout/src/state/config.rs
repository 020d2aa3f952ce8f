//! # Configuration State
//!
//! Stores register configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`TILL_*`)
//! 2. Config file (`--config <path>`, else `till.toml` in the platform
//!    config directory when present)
//! 3. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use till_core::validation::validate_tax_rate_bps;
use till_core::{Money, TaxRate};

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid VAT rate: {0}")]
    VatRate(String),
}

/// Register configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigState {
    /// Store name (printed on receipts)
    pub store_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u32,

    /// VAT rate in basis points, e.g. 1500 = 15%. Shelf prices include it.
    pub vat_rate_bps: u32,
}

impl Default for ConfigState {
    /// ## Default Values
    /// - Store: "Till POS Dev Store"
    /// - Currency: SAR
    /// - VAT: 15%, included in prices
    fn default() -> Self {
        ConfigState {
            store_name: "Till POS Dev Store".to_string(),
            currency_symbol: "SAR ".to_string(),
            currency_decimals: 2,
            vat_rate_bps: 1500,
        }
    }
}

impl ConfigState {
    /// Loads configuration: defaults, then the config file, then env.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => Self::from_file(&path)?,
            None => ConfigState::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        validate_tax_rate_bps(config.vat_rate_bps).map_err(|e| ConfigError::VatRate(e.to_string()))?;

        debug!(store = %config.store_name, vat_bps = config.vat_rate_bps, "Config loaded");
        Ok(config)
    }

    /// Parses a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Applies environment overrides.
    ///
    /// ## Environment Variables
    /// - `TILL_STORE_NAME`: Override store name
    /// - `TILL_VAT_RATE`: Override VAT rate as a percentage (e.g., "15")
    /// - `TILL_CURRENCY_SYMBOL`: Override currency symbol
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(store_name) = var("TILL_STORE_NAME") {
            self.store_name = store_name;
        }

        if let Some(rate) = var("TILL_VAT_RATE") {
            let pct: f64 = rate
                .trim()
                .parse()
                .map_err(|_| ConfigError::VatRate(rate.clone()))?;
            if !(0.0..=100.0).contains(&pct) {
                return Err(ConfigError::VatRate(rate));
            }
            self.vat_rate_bps = TaxRate::from_percentage(pct).bps();
        }

        if let Some(symbol) = var("TILL_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }

        Ok(())
    }

    /// The VAT rate applied to every cart.
    pub fn vat_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.vat_rate_bps)
    }

    /// Formats an amount for display, rounded to the currency's decimals.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "SAR 12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let rounded = amount
            .amount()
            .round_dp_with_strategy(self.currency_decimals, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded < Decimal::ZERO { "-" } else { "" };

        let mut abs = rounded.abs();
        abs.rescale(self.currency_decimals);
        format!("{}{}{}", sign, self.currency_symbol, abs)
    }
}

/// `till.toml` in the platform config directory, when it exists.
///
/// - **Linux**: `~/.config/till-pos/till.toml`
/// - **macOS**: `~/Library/Application Support/com.till.till-pos/till.toml`
/// - **Windows**: `%APPDATA%\till\till-pos\config\till.toml`
fn default_config_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("com", "till", "till-pos")?;
    let path = dirs.config_dir().join("till.toml");
    if path.is_file() {
        Some(path)
    } else {
        if !dirs.config_dir().exists() {
            warn!(dir = ?dirs.config_dir(), "Config directory missing, using defaults");
        }
        None
    }
}
