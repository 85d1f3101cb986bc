//! Extraction configuration
//!
//! Resolution order: defaults, then an optional JSON file, then `AXTREE_*`
//! environment variables. Command line flags are applied by the caller last.

use crate::errors::ExtractionError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Logical-point to device-pixel factor of the display a screenshot came from.
///
/// Captured once by the caller and passed explicitly into rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DisplayScale(f64);

impl DisplayScale {
    pub fn new(factor: f64) -> Result<Self, ExtractionError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ExtractionError::Config(format!(
                "display scale must be a positive finite number, got {factor}"
            )));
        }
        Ok(Self(factor))
    }

    pub fn factor(&self) -> f64 {
        self.0
    }
}

impl Default for DisplayScale {
    fn default() -> Self {
        Self(1.0)
    }
}

impl TryFrom<f64> for DisplayScale {
    type Error = ExtractionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        DisplayScale::new(value)
    }
}

impl From<DisplayScale> for f64 {
    fn from(value: DisplayScale) -> Self {
        value.0
    }
}

/// Configuration for tree extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Depth budget below the root; `None` is unbounded
    pub max_depth: Option<usize>,
    pub display_scale: DisplayScale,
    /// Wall-clock budget for one window during multi-window extraction
    pub window_timeout_ms: u64,
    pub max_concurrent_windows: usize,
    /// Augment each window with the hit-tested root under the probe point
    pub hit_test: bool,
    /// Probe point distance from the window origin on both axes
    pub hit_test_offset: f64,
    /// Replace spaces in titles with underscores
    pub underscore_titles: bool,
    /// Bound on the parent walk during hit-test root discovery
    pub max_parent_hops: usize,
    /// How many element-valued values may nest inside each other
    pub max_value_nesting: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            display_scale: DisplayScale::default(),
            window_timeout_ms: 30_000,
            max_concurrent_windows: 4,
            hit_test: false,
            hit_test_offset: 50.0,
            underscore_titles: true,
            max_parent_hops: 256,
            max_value_nesting: 2,
        }
    }
}

impl ExtractionConfig {
    /// Load from a JSON file. Missing fields fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ExtractionError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        debug!("[config] Loaded configuration from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    /// Apply `AXTREE_*` environment overrides. Unparseable values are ignored
    /// with a warning.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Same as [`ExtractionConfig::with_env_overrides`] with an injectable lookup.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup("AXTREE_MAX_DEPTH") {
            match raw.trim().parse::<usize>() {
                Ok(depth) => self.max_depth = Some(depth),
                Err(e) => warn!("[config] Ignoring AXTREE_MAX_DEPTH={raw:?}: {e}"),
            }
        }
        if let Some(raw) = lookup("AXTREE_DISPLAY_SCALE") {
            match raw.trim().parse::<f64>().map_err(|e| e.to_string()).and_then(|v| {
                DisplayScale::new(v).map_err(|e| e.to_string())
            }) {
                Ok(scale) => self.display_scale = scale,
                Err(e) => warn!("[config] Ignoring AXTREE_DISPLAY_SCALE={raw:?}: {e}"),
            }
        }
        if let Some(raw) = lookup("AXTREE_WINDOW_TIMEOUT_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.window_timeout_ms = ms,
                Err(e) => warn!("[config] Ignoring AXTREE_WINDOW_TIMEOUT_MS={raw:?}: {e}"),
            }
        }
        if let Some(raw) = lookup("AXTREE_HIT_TEST") {
            self.hit_test = raw == "1" || raw.eq_ignore_ascii_case("true");
        }
        self
    }

    pub fn validate(&self) -> Result<(), ExtractionError> {
        if self.max_concurrent_windows == 0 {
            return Err(ExtractionError::Config(
                "max_concurrent_windows must be at least 1".to_string(),
            ));
        }
        if !self.hit_test_offset.is_finite() {
            return Err(ExtractionError::Config(
                "hit_test_offset must be finite".to_string(),
            ));
        }
        DisplayScale::new(self.display_scale.factor())?;
        Ok(())
    }

    pub fn window_timeout(&self) -> Duration {
        Duration::from_millis(self.window_timeout_ms)
    }
}
