//! Configuration management for the seed-lot ledger
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with SEEDLOT_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Ledger rules configuration
    pub ledger: LedgerSettings,

    /// Audit trail configuration
    pub audit: AuditConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive, overridden by RUST_LOG
    pub filter: String,

    /// Output format: "pretty" or "json"
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Settings the ledger engine consults on every operation
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LedgerSettings {
    /// Decimal places recorded for kilogram quantities
    pub quantity_scale: u32,

    /// Prefix for generated lot codes
    pub lot_code_prefix: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuditConfig {
    /// Keep an in-process append-only audit trail of ledger events
    pub enabled: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("SEEDLOT_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("logging.filter", "seed_lot_ledger=info,seed_ledger=info")?
            .set_default("logging.format", "pretty")?
            .set_default("ledger.quantity_scale", 3)?
            .set_default("ledger.lot_code_prefix", "SL")?
            .set_default("audit.enabled", true)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SEEDLOT_ prefix)
            .add_source(
                Environment::with_prefix("SEEDLOT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            quantity_scale: 3,
            lot_code_prefix: "SL".to_string(),
        }
    }
}
