//! Configuration types for pm-maker

use crate::telemetry::LogFormat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub platform: Platform,
    pub market: MarketConfig,
    pub quoting: QuotingConfig,
    pub inventory: InventoryConfig,
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Supported venues
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Polymarket,
    Kalshi,
    Limitless,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Polymarket => write!(f, "polymarket"),
            Platform::Kalshi => write!(f, "kalshi"),
            Platform::Limitless => write!(f, "limitless"),
        }
    }
}

/// Market selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketConfig {
    /// Search query used to find the market
    pub query: String,
    /// Which search result to quote (0 = first)
    #[serde(default)]
    pub index: usize,
}

/// How `rebalance_threshold` gates the inventory skew
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SkewMode {
    /// Skew applied linearly at every inventory level
    #[default]
    Linear,
    /// No skew until |inventory| exceeds the rebalance threshold
    Deadband,
}

/// Quote construction parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuotingConfig {
    /// Distance between bid and ask around the adjusted fair price
    pub target_spread: Decimal,
    /// Smallest spread ever quoted (unless both price bounds are saturated)
    pub min_spread: Decimal,
    /// Contracts per order
    pub order_size: u64,
    /// Price shift per contract of inventory
    pub inventory_adjustment_factor: Decimal,
    #[serde(default)]
    pub skew_mode: SkewMode,
    /// Books thinner than this at the touch fall back to the last price
    #[serde(default)]
    pub min_book_depth: Decimal,
}

/// Inventory limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InventoryConfig {
    /// Quoting halts once |position| reaches this
    pub max_inventory: u64,
    /// Quoting resumes once |position| falls below this
    pub rebalance_threshold: u64,
    /// Seed the position from the venue at startup
    #[serde(default)]
    pub sync_on_start: bool,
    /// Adopt the venue-reported position every cycle
    #[serde(default)]
    pub reconcile_each_cycle: bool,
}

/// Loop behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuntimeConfig {
    /// Seconds between quote refreshes
    pub update_interval_secs: u64,
    /// Simulate order placement and cancellation
    #[serde(default = "default_true")]
    pub dry_run: bool,
}

impl RuntimeConfig {
    /// Update interval as a `Duration`
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Serve Prometheus metrics on this port when set
    pub metrics_port: Option<u16>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration errors; all of them are fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("Failed to build exchange client: {0}")]
    Client(#[source] crate::exchange::ExchangeError),
    #[error("Live order entry is not available for {0}; set runtime.dry_run = true")]
    LiveTradingUnavailable(Platform),
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let q = &self.quoting;

        if q.target_spread <= Decimal::ZERO {
            return Err(ConfigError::invalid("quoting.target_spread", "must be positive"));
        }
        if q.min_spread <= Decimal::ZERO {
            return Err(ConfigError::invalid("quoting.min_spread", "must be positive"));
        }
        if q.min_spread > q.target_spread {
            return Err(ConfigError::invalid(
                "quoting.min_spread",
                format!(
                    "{} exceeds target_spread {}",
                    q.min_spread, q.target_spread
                ),
            ));
        }
        if q.order_size == 0 {
            return Err(ConfigError::invalid("quoting.order_size", "must be positive"));
        }
        if q.inventory_adjustment_factor < Decimal::ZERO {
            return Err(ConfigError::invalid(
                "quoting.inventory_adjustment_factor",
                "must not be negative",
            ));
        }
        if q.min_book_depth < Decimal::ZERO {
            return Err(ConfigError::invalid(
                "quoting.min_book_depth",
                "must not be negative",
            ));
        }

        let inv = &self.inventory;
        if inv.max_inventory == 0 {
            return Err(ConfigError::invalid("inventory.max_inventory", "must be positive"));
        }
        if inv.rebalance_threshold == 0 || inv.rebalance_threshold > inv.max_inventory {
            return Err(ConfigError::invalid(
                "inventory.rebalance_threshold",
                format!("must be in 1..={}", inv.max_inventory),
            ));
        }

        if self.runtime.update_interval_secs == 0 {
            return Err(ConfigError::invalid(
                "runtime.update_interval_secs",
                "must be positive",
            ));
        }
        if self.market.query.trim().is_empty() {
            return Err(ConfigError::invalid("market.query", "must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quoting::{QuoteEngine, QuoteParams};
    use rust_decimal_macros::dec;
    use std::io::Write;

    const SAMPLE: &str = r#"
        platform = "polymarket"

        [market]
        query = "Trump"
        index = 0

        [quoting]
        target_spread = 0.04
        min_spread = 0.02
        order_size = 10
        inventory_adjustment_factor = 0.001

        [inventory]
        max_inventory = 100
        rebalance_threshold = 50

        [runtime]
        update_interval_secs = 30
        dry_run = true

        [telemetry]
        log_level = "debug"
        log_format = "json"
        metrics_port = 9100
    "#;

    #[test]
    fn test_config_deserialize() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.platform, Platform::Polymarket);
        assert_eq!(config.market.query, "Trump");
        assert_eq!(config.quoting.target_spread, dec!(0.04));
        assert_eq!(config.quoting.order_size, 10);
        assert_eq!(config.quoting.skew_mode, SkewMode::Linear);
        assert_eq!(config.quoting.min_book_depth, dec!(0));
        assert_eq!(config.inventory.rebalance_threshold, 50);
        assert!(!config.inventory.sync_on_start);
        assert_eq!(config.runtime.update_interval(), Duration::from_secs(30));
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
        assert_eq!(config.telemetry.metrics_port, Some(9100));
    }

    #[test]
    fn test_unknown_platform_rejected() {
        let toml = SAMPLE.replace("\"polymarket\"", "\"betfair\"");
        let err = Config::from_toml_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_other_platforms() {
        let kalshi = SAMPLE.replace("\"polymarket\"", "\"kalshi\"");
        assert_eq!(Config::from_toml_str(&kalshi).unwrap().platform, Platform::Kalshi);
        let limitless = SAMPLE.replace("\"polymarket\"", "\"limitless\"");
        assert_eq!(
            Config::from_toml_str(&limitless).unwrap().platform,
            Platform::Limitless
        );
    }

    #[test]
    fn test_min_spread_above_target_rejected() {
        let toml = SAMPLE.replace("min_spread = 0.02", "min_spread = 0.05");
        let err = Config::from_toml_str(&toml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "quoting.min_spread",
                ..
            }
        ));
    }

    #[test]
    fn test_min_spread_equal_to_target_accepted() {
        let toml = SAMPLE.replace("min_spread = 0.02", "min_spread = 0.04");
        assert!(Config::from_toml_str(&toml).is_ok());
    }

    #[test]
    fn test_spread_wider_than_price_range_quotes_full_range() {
        let toml = SAMPLE
            .replace("target_spread = 0.04", "target_spread = 0.99")
            .replace("min_spread = 0.02", "min_spread = 0.99");
        let config = Config::from_toml_str(&toml).unwrap();

        let quote = QuoteEngine::new(QuoteParams::from(&config)).compute_quotes(dec!(0.50), 0);
        assert_eq!(quote.bid_price, dec!(0.01));
        assert_eq!(quote.ask_price, dec!(0.99));
    }

    #[test]
    fn test_zero_order_size_rejected() {
        let toml = SAMPLE.replace("order_size = 10", "order_size = 0");
        let err = Config::from_toml_str(&toml).unwrap_err();
        assert!(err.to_string().contains("quoting.order_size"));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let toml = SAMPLE.replace("update_interval_secs = 30", "update_interval_secs = 0");
        assert!(Config::from_toml_str(&toml).is_err());
    }

    #[test]
    fn test_threshold_above_max_rejected() {
        let toml = SAMPLE.replace("rebalance_threshold = 50", "rebalance_threshold = 150");
        let err = Config::from_toml_str(&toml).unwrap_err();
        assert!(err.to_string().contains("inventory.rebalance_threshold"));
    }

    #[test]
    fn test_negative_adjustment_rejected() {
        let toml = SAMPLE.replace(
            "inventory_adjustment_factor = 0.001",
            "inventory_adjustment_factor = -0.001",
        );
        assert!(Config::from_toml_str(&toml).is_err());
    }

    #[test]
    fn test_defaults_applied() {
        let toml = r#"
            platform = "kalshi"

            [market]
            query = "fed"

            [quoting]
            target_spread = 0.04
            min_spread = 0.02
            order_size = 5
            inventory_adjustment_factor = 0.01
            skew_mode = "deadband"

            [inventory]
            max_inventory = 100
            rebalance_threshold = 50

            [runtime]
            update_interval_secs = 10
        "#;
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.market.index, 0);
        assert!(config.runtime.dry_run);
        assert_eq!(config.quoting.skew_mode, SkewMode::Deadband);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.telemetry.metrics_port.is_none());
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::Read(_))));
    }

    #[test]
    fn test_config_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.quoting.min_spread, dec!(0.02));
    }

    #[test]
    fn test_platform_display() {
        assert_eq!(Platform::Polymarket.to_string(), "polymarket");
        assert_eq!(Platform::Kalshi.to_string(), "kalshi");
        assert_eq!(Platform::Limitless.to_string(), "limitless");
    }
}
