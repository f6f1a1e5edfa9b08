//! # Configuration
//!
//! Settings that change how totals are computed and how new transactions
//! start out.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BANKLINE_ROUNDING=bankers                                          │
//! │     BANKLINE_LINE_AMOUNT_TYPE=Inclusive                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/bankline/bankline.toml (Linux)                           │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     rounding = half_up, line_amount_type = Exclusive                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # bankline.toml
//! [totals]
//! rounding = "half_up"  # half_up | bankers
//!
//! [defaults]
//! line_amount_type = "Exclusive"  # Exclusive | Inclusive | NoTax
//! ```
//!
//! This is the only module in the crate that touches the filesystem.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::calculator::Aggregator;
use crate::error::ConfigError;
use crate::money::RoundingMode;
use crate::types::LineAmountType;

pub const ENV_ROUNDING: &str = "BANKLINE_ROUNDING";
pub const ENV_LINE_AMOUNT_TYPE: &str = "BANKLINE_LINE_AMOUNT_TYPE";

// =============================================================================
// Sections
// =============================================================================

/// How totals are rounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsSettings {
    #[serde(default)]
    pub rounding: RoundingMode,
}

/// Initial values for newly constructed transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsSettings {
    #[serde(default)]
    pub line_amount_type: LineAmountType,
}

// =============================================================================
// Bankline Config
// =============================================================================

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanklineConfig {
    #[serde(default)]
    pub totals: TotalsSettings,

    #[serde(default)]
    pub defaults: DefaultsSettings,
}

impl BanklineConfig {
    /// Loads configuration from file (if present) and applies env overrides.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading bankline config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load bankline config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a config file without applying env overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> Result<(), ConfigError> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Bankline config saved");
        Ok(())
    }

    /// Applies overrides from a key lookup (the environment in production).
    ///
    /// Unparseable values are errors: a mistyped rounding mode must not
    /// silently fall back to the default convention.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(ENV_ROUNDING) {
            debug!(rounding = %mode, "Overriding rounding mode from environment");
            self.totals.rounding = mode.parse()?;
        }

        if let Some(kind) = lookup(ENV_LINE_AMOUNT_TYPE) {
            debug!(line_amount_type = %kind, "Overriding line amount type from environment");
            self.defaults.line_amount_type =
                LineAmountType::parse(kind.trim()).ok_or_else(|| ConfigError::InvalidValue {
                    key: ENV_LINE_AMOUNT_TYPE.to_string(),
                    reason: format!("'{}' is not one of Inclusive, Exclusive, NoTax", kind),
                })?;
        }

        Ok(())
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bankline", "bankline")
            .map(|dirs| dirs.config_dir().join("bankline.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn rounding(&self) -> RoundingMode {
        self.totals.rounding
    }

    /// A calculator using the configured rounding mode.
    pub fn aggregator(&self) -> Aggregator {
        Aggregator::new(self.totals.rounding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = BanklineConfig::default();
        assert_eq!(config.rounding(), RoundingMode::HalfUp);
        assert_eq!(config.defaults.line_amount_type, LineAmountType::Exclusive);
        assert_eq!(config.aggregator(), Aggregator::new(RoundingMode::HalfUp));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: BanklineConfig = toml::from_str("[totals]\nrounding = \"bankers\"\n").unwrap();
        assert_eq!(config.rounding(), RoundingMode::Bankers);
        assert_eq!(config.defaults.line_amount_type, LineAmountType::Exclusive);

        let config: BanklineConfig = toml::from_str("").unwrap();
        assert_eq!(config, BanklineConfig::default());
    }

    #[test]
    fn test_invalid_toml_value_is_parse_error() {
        let result: Result<BanklineConfig, _> = toml::from_str("[totals]\nrounding = \"up\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = BanklineConfig::default();
        config
            .apply_overrides(lookup(&[
                (ENV_ROUNDING, "bankers"),
                (ENV_LINE_AMOUNT_TYPE, "Inclusive"),
            ]))
            .unwrap();

        assert_eq!(config.rounding(), RoundingMode::Bankers);
        assert_eq!(config.defaults.line_amount_type, LineAmountType::Inclusive);
    }

    #[test]
    fn test_bad_override_is_error() {
        let mut config = BanklineConfig::default();
        assert!(config
            .apply_overrides(lookup(&[(ENV_ROUNDING, "ceiling")]))
            .is_err());
        assert!(config
            .apply_overrides(lookup(&[(ENV_LINE_AMOUNT_TYPE, "Gross")]))
            .is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bankline.toml");

        let mut config = BanklineConfig::default();
        config.totals.rounding = RoundingMode::Bankers;
        config.defaults.line_amount_type = LineAmountType::NoTax;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[totals]"));
        assert!(contents.contains("[defaults]"));

        assert_eq!(BanklineConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(BanklineConfig::from_file(&dir.path().join("absent.toml")).is_err());
    }
}
