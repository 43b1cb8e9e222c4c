//! TOML configuration loading and validation.

use std::path::Path;

use serde::Deserialize;
use weightbook::{RequestDefaults, SeedSource};

use crate::error::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub portfolio: PortfolioConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub cost: CostConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioConfig {
    /// Currency all values are reported in; FX rates convert into it.
    pub base_currency: String,
}

/// Applied when a request omits the field.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub min_order_value: f64,
    #[serde(default = "default_lot_size")]
    pub lot_size: i64,
    #[serde(default)]
    pub seed_source: SeedSource,
}

fn default_lot_size() -> i64 {
    1
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            min_order_value: 0.0,
            lot_size: default_lot_size(),
            seed_source: SeedSource::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CostConfig {
    #[serde(default = "default_commission")]
    pub commission_per_share: f64,
    #[serde(default = "default_commission_min")]
    pub commission_min: f64,
    #[serde(default = "default_slippage")]
    pub slippage_bps: u32,
}

fn default_commission() -> f64 {
    0.0035
}
fn default_commission_min() -> f64 {
    0.35
}
fn default_slippage() -> u32 {
    5
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            commission_per_share: default_commission(),
            commission_min: default_commission_min(),
            slippage_bps: default_slippage(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_audit_file")]
    pub audit_file: String,
}

fn default_log_dir() -> String {
    "./logs".into()
}
fn default_audit_file() -> String {
    "audit.jsonl".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            audit_file: default_audit_file(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        config.portfolio.base_currency = config.portfolio.base_currency.trim().to_ascii_uppercase();
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        let base = &self.portfolio.base_currency;
        if base.len() != 3 || !base.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::Config(format!(
                "base_currency must be a 3-letter code, got '{base}'"
            )));
        }
        if self.defaults.lot_size <= 0 {
            return Err(Error::Config("defaults.lot_size must be > 0".into()));
        }
        if !self.defaults.min_order_value.is_finite() || self.defaults.min_order_value < 0.0 {
            return Err(Error::Config("defaults.min_order_value must be >= 0".into()));
        }
        if self.cost.commission_per_share < 0.0 || self.cost.commission_min < 0.0 {
            return Err(Error::Config("commissions must be >= 0".into()));
        }
        Ok(())
    }

    /// Defaults handed to request parsing.
    pub fn request_defaults(&self) -> RequestDefaults {
        RequestDefaults {
            min_order_value: self.defaults.min_order_value,
            lot_size: self.defaults.lot_size,
            seed_source: self.defaults.seed_source,
        }
    }

    /// Full path to the audit log file.
    pub fn audit_path(&self) -> std::path::PathBuf {
        Path::new(&self.logging.dir).join(&self.logging.audit_file)
    }
}
