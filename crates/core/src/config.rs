//! Detector configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Error for configuration values that are out of range
///
/// Raised once at construction; detection itself never fails on
/// configuration grounds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("time window must be positive")]
    ZeroTimeWindow,
    #[error("min_confidence must be within 0.0..=1.0, got {0}")]
    ConfidenceOutOfRange(f64),
    #[error("min_events_for_complex must be at least 2, got {0}")]
    BatchThresholdTooSmall(usize),
}

/// Tunables for operation detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Maximum gap between events folded into one cluster
    pub time_window: Duration,
    /// Operations below this confidence are dropped
    pub min_confidence: f64,
    /// Distinct files required before a cluster counts as a batch update
    pub min_events_for_complex: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            time_window: Duration::from_millis(500),
            min_confidence: 0.7,
            min_events_for_complex: 3,
        }
    }
}

impl DetectorConfig {
    /// Build a validated config with the default batch threshold
    pub fn new(time_window: Duration, min_confidence: f64) -> Result<Self, ConfigError> {
        let config = Self { time_window, min_confidence, ..Self::default() };
        config.validate()?;
        Ok(config)
    }

    /// Check every field is in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_window.is_zero() {
            return Err(ConfigError::ZeroTimeWindow);
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::ConfidenceOutOfRange(self.min_confidence));
        }
        if self.min_events_for_complex < 2 {
            return Err(ConfigError::BatchThresholdTooSmall(self.min_events_for_complex));
        }
        Ok(())
    }
}
