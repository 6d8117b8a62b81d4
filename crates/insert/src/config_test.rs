//! Tests for insert configuration

use std::str::FromStr;

use crate::config::{ConfigError, InsertConfig};

#[test]
fn test_defaults() {
    let config = InsertConfig::default();
    assert_eq!(config.insert_timeout_ms, 15_000);
    assert_eq!(config.ts_min, 0);
    assert_eq!(config.ts_max, i64::MAX);
    assert_eq!(config.pool_count, 1);
}

#[test]
fn test_empty_toml_uses_defaults() {
    let config = InsertConfig::from_str("").unwrap();
    assert_eq!(config.insert_timeout_ms, 15_000);
    assert_eq!(config.pool_count, 1);
}

#[test]
fn test_partial_toml() {
    let config = InsertConfig::from_str("pool_count = 8\nts_max = 2000000000").unwrap();
    assert_eq!(config.pool_count, 8);
    assert_eq!(config.ts_max, 2_000_000_000);
    assert_eq!(config.insert_timeout_ms, 15_000); // untouched default
}

#[test]
fn test_invalid_toml_rejected() {
    assert!(matches!(
        InsertConfig::from_str("pool_count = \"many\""),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_zero_pool_count_rejected() {
    assert!(matches!(
        InsertConfig::from_str("pool_count = 0"),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_inverted_ts_window_rejected() {
    assert!(matches!(
        InsertConfig::from_str("ts_min = 10\nts_max = 5"),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_zero_timeout_rejected() {
    assert!(matches!(
        InsertConfig::from_str("insert_timeout_ms = 0"),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_valid_ts_bounds() {
    let config = InsertConfig {
        ts_min: 0,
        ts_max: 100,
        ..InsertConfig::default()
    };
    assert!(config.valid_ts(0));
    assert!(config.valid_ts(100));
    assert!(config.valid_ts(50));
    assert!(!config.valid_ts(-1));
    assert!(!config.valid_ts(101));
}

#[test]
fn test_timeout_duration() {
    let config = InsertConfig {
        insert_timeout_ms: 250,
        ..InsertConfig::default()
    };
    assert_eq!(config.timeout().as_millis(), 250);
}
