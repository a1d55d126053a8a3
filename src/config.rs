use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Which rule set the classifier applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierStrategy {
    MagnitudeOnly,
    MagnitudeHeartRate,
}

/// Classifier thresholds. Magnitudes are deviation from 1 g, in g.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub strategy: ClassifierStrategy,
    pub deep_threshold: f64,
    pub light_threshold: f64,
    /// bpm
    pub hr_deep_threshold: u16,
    /// bpm
    pub hr_light_threshold: u16,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            strategy: ClassifierStrategy::MagnitudeOnly,
            deep_threshold: 0.05,
            light_threshold: 0.2,
            hr_deep_threshold: 80,
            hr_light_threshold: 95,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub classifier: ClassifierConfig,
    /// Magnitude strictly above this is an adverse event (g deviation).
    pub adverse_threshold: f64,
    /// Accelerometer poll cadence in milliseconds (default: 800).
    pub poll_interval_ms: u64,
    /// Consolidation + flush period in milliseconds (default: 120000).
    pub flush_interval_ms: u64,
    /// Max in-memory sleep log entries between flushes.
    pub sleep_buffer_cap: usize,
    /// Max in-memory adverse events between flushes.
    pub adverse_buffer_cap: usize,
    /// Persisted sleep entries older than this are purged at flush (default: 24h).
    pub retention_ms: u64,
    /// Directory for the file-backed store.
    pub storage_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            adverse_threshold: 0.5,
            poll_interval_ms: 800,
            flush_interval_ms: 120_000,
            sleep_buffer_cap: 20,
            adverse_buffer_cap: 20,
            retention_ms: 24 * 60 * 60 * 1000,
            storage_dir: PathBuf::from("sleepwatch-data"),
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.classifier;
        if !(c.deep_threshold >= 0.0 && c.deep_threshold < c.light_threshold) {
            return Err(ConfigError::Invalid(format!(
                "deep_threshold ({}) must be non-negative and below light_threshold ({})",
                c.deep_threshold, c.light_threshold
            )));
        }
        if c.hr_deep_threshold > c.hr_light_threshold {
            return Err(ConfigError::Invalid(format!(
                "hr_deep_threshold ({}) must not exceed hr_light_threshold ({})",
                c.hr_deep_threshold, c.hr_light_threshold
            )));
        }
        if !(self.adverse_threshold >= 0.0) {
            return Err(ConfigError::Invalid("adverse_threshold must be non-negative".into()));
        }
        if self.poll_interval_ms == 0 || self.flush_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll and flush intervals must be non-zero".into()));
        }
        if self.sleep_buffer_cap == 0 || self.adverse_buffer_cap == 0 {
            return Err(ConfigError::Invalid("buffer caps must be non-zero".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Two full sample periods.
    pub fn debounce_window(&self) -> Duration {
        self.poll_interval() * 2
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_millis(self.retention_ms)
    }
}
