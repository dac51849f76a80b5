//! Configuration loading tests

use pm_maker::config::{Config, ConfigError, Platform, SkewMode};
use rust_decimal_macros::dec;
use std::io::Write;
use tempfile::NamedTempFile;
use tokio_test::{assert_err, assert_ok};

const EXAMPLE_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example");

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_example_loads() {
    let config = assert_ok!(Config::load(EXAMPLE_PATH));

    assert_eq!(config.platform, Platform::Polymarket);
    assert_eq!(config.quoting.target_spread, dec!(0.04));
    assert_eq!(config.quoting.min_spread, dec!(0.02));
    assert_eq!(config.quoting.skew_mode, SkewMode::Linear);
    assert!(config.runtime.dry_run);
    assert!(config.telemetry.metrics_port.is_none());
}

#[test]
fn test_config_rejects_min_spread_above_target() {
    let example = std::fs::read_to_string(EXAMPLE_PATH).unwrap();
    let file = write_config(&example.replace("min_spread = 0.02", "min_spread = 0.06"));

    let err = assert_err!(Config::load(file.path()));
    assert!(matches!(
        err,
        ConfigError::Invalid {
            field: "quoting.min_spread",
            ..
        }
    ));
}

#[test]
fn test_config_rejects_unknown_platform() {
    let example = std::fs::read_to_string(EXAMPLE_PATH).unwrap();
    let file = write_config(&example.replace(
        "platform = \"polymarket\"",
        "platform = \"binance\"",
    ));

    let err = assert_err!(Config::load(file.path()));
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_config_missing_file() {
    let err = assert_err!(Config::load("/nonexistent/pm-maker/config.toml"));
    assert!(matches!(err, ConfigError::Read(_)));
}
