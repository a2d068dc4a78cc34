//! Configuration management for the surgical inventory engine
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with SIT__ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    default_plate_markup, validate_dead_stock_threshold, validate_markup,
    DEFAULT_DEAD_STOCK_THRESHOLD_MONTHS,
};

use crate::error::{AppError, AppResult};

/// Main engine configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Inventory rules
    pub inventory: InventorySettings,

    /// Stock movement record rules
    pub records: RecordSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InventorySettings {
    /// Months without movement before an item is dead stock (3, 6, 9 or 12)
    pub dead_stock_threshold_months: u32,

    /// Multiplier from cost to selling price for newly cut plate variants
    pub plate_markup: Decimal,

    /// Show low stock alerts on the dashboard
    pub low_stock_alert_enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecordSettings {
    /// Skip the selling-below-base check for internal usage records
    pub usage_bypasses_margin_check: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("SIT_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default(
                "inventory.dead_stock_threshold_months",
                i64::from(DEFAULT_DEAD_STOCK_THRESHOLD_MONTHS),
            )?
            .set_default("inventory.plate_markup", default_plate_markup().to_string())?
            .set_default("inventory.low_stock_alert_enabled", true)?
            .set_default("records.usage_bypasses_margin_check", true)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SIT__ prefix)
            .add_source(
                Environment::with_prefix("SIT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Check values the type system cannot express
    pub fn validate(&self) -> AppResult<()> {
        validate_dead_stock_threshold(self.inventory.dead_stock_threshold_months)
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        validate_markup(self.inventory.plate_markup)
            .map_err(|e| AppError::Configuration(e.to_string()))?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            inventory: InventorySettings::default(),
            records: RecordSettings::default(),
        }
    }
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            dead_stock_threshold_months: DEFAULT_DEAD_STOCK_THRESHOLD_MONTHS,
            plate_markup: default_plate_markup(),
            low_stock_alert_enabled: true,
        }
    }
}

impl Default for RecordSettings {
    fn default() -> Self {
        Self {
            usage_bypasses_margin_check: true,
        }
    }
}
