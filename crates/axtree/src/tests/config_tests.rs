//! Tests for configuration loading and overrides

use crate::config::{DisplayScale, ExtractionConfig};
use crate::errors::ExtractionError;
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

#[test]
fn test_defaults() {
    let config = ExtractionConfig::default();
    assert_eq!(config.max_depth, None);
    assert_eq!(config.display_scale.factor(), 1.0);
    assert_eq!(config.window_timeout(), Duration::from_secs(30));
    assert_eq!(config.max_concurrent_windows, 4);
    assert!(!config.hit_test);
    assert_eq!(config.hit_test_offset, 50.0);
    assert!(config.underscore_titles);
    assert!(config.validate().is_ok());
}

#[test]
fn test_display_scale_rejects_bad_factors() {
    assert!(DisplayScale::new(2.0).is_ok());
    for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(DisplayScale::new(bad), Err(ExtractionError::Config(_))));
    }
}

#[test]
fn test_validate_rejects_zero_concurrency() {
    let config = ExtractionConfig {
        max_concurrent_windows: 0,
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ExtractionError::Config(_))));
}

#[test]
fn test_from_file_fills_missing_fields() {
    let mut file = tempfile::NamedTempFile::new().expect("Should create temp file");
    write!(file, r#"{{"max_depth": 3, "display_scale": 2.0}}"#).expect("Should write config");

    let config = ExtractionConfig::from_file(file.path()).expect("Should load config");
    assert_eq!(config.max_depth, Some(3));
    assert_eq!(config.display_scale.factor(), 2.0);
    assert_eq!(config.window_timeout_ms, 30_000);
}

#[test]
fn test_from_file_rejects_negative_scale() {
    let mut file = tempfile::NamedTempFile::new().expect("Should create temp file");
    write!(file, r#"{{"display_scale": -1.5}}"#).expect("Should write config");
    assert!(ExtractionConfig::from_file(file.path()).is_err());
}

#[test]
fn test_env_overrides() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("AXTREE_MAX_DEPTH", "5"),
        ("AXTREE_DISPLAY_SCALE", "2"),
        ("AXTREE_WINDOW_TIMEOUT_MS", "1500"),
        ("AXTREE_HIT_TEST", "true"),
    ]);
    let config = ExtractionConfig::default()
        .with_overrides_from(|key| vars.get(key).map(|v| v.to_string()));
    assert_eq!(config.max_depth, Some(5));
    assert_eq!(config.display_scale.factor(), 2.0);
    assert_eq!(config.window_timeout_ms, 1500);
    assert!(config.hit_test);
}

#[test]
fn test_unparseable_env_overrides_are_ignored() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("AXTREE_MAX_DEPTH", "deep"),
        ("AXTREE_DISPLAY_SCALE", "0"),
    ]);
    let config = ExtractionConfig::default()
        .with_overrides_from(|key| vars.get(key).map(|v| v.to_string()));
    assert_eq!(config.max_depth, None);
    assert_eq!(config.display_scale.factor(), 1.0);
}
