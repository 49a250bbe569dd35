//! Startup configuration
//!
//! Every tunable constant lives in [`BeatConfig`]. Values are fixed for the
//! lifetime of the process; only gain and sensitivity move at runtime, and
//! only inside the ranges configured here.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Beat detection and display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeatConfig {
    /// Samples per processing block
    pub block_size: usize,

    /// Number of block energies kept for the adaptive average
    pub history_length: usize,

    /// Initial threshold multiplier (lower = more sensitive)
    pub sensitivity_multiplier: f32,

    /// Refractory period between beats, in seconds
    pub min_interval_secs: f64,

    /// Initial gain in dB
    pub initial_gain_db: f32,

    pub gain_min_db: f32,
    pub gain_max_db: f32,
    pub gain_step_db: f32,

    pub sens_min: f32,
    pub sens_max: f32,
    pub sens_step: f32,

    /// Flash duration after a beat, in milliseconds
    pub flash_ms: u64,

    /// How long the control bars stay visible after a change, in seconds
    pub bar_timeout_secs: f64,

    /// Consumer loop rate
    pub poll_hz: u32,

    /// Maximum number of chunks held by the capture queue
    pub queue_capacity: usize,

    /// Capture source (`None` = default input device)
    pub source_id: Option<String>,
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self {
            block_size: 1024,
            history_length: 43,
            sensitivity_multiplier: 2.0,
            min_interval_secs: 0.12,
            initial_gain_db: 0.0,
            gain_min_db: -20.0,
            gain_max_db: 20.0,
            gain_step_db: 1.0,
            sens_min: 1.0,
            sens_max: 5.0,
            sens_step: 0.1,
            flash_ms: 120,
            bar_timeout_secs: 2.0,
            poll_hz: 60,
            queue_capacity: 256,
            source_id: None,
        }
    }
}

impl BeatConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: BeatConfig = serde_json::from_str(&text)?;
        config.validate()?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Check ranges and internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.block_size == 0 {
            return invalid("block_size must be greater than zero".into());
        }
        if self.history_length == 0 {
            return invalid("history_length must be greater than zero".into());
        }
        if self.queue_capacity == 0 {
            return invalid("queue_capacity must be greater than zero".into());
        }
        if self.poll_hz == 0 {
            return invalid("poll_hz must be greater than zero".into());
        }

        let floats = [
            ("sensitivity_multiplier", self.sensitivity_multiplier),
            ("initial_gain_db", self.initial_gain_db),
            ("gain_min_db", self.gain_min_db),
            ("gain_max_db", self.gain_max_db),
            ("gain_step_db", self.gain_step_db),
            ("sens_min", self.sens_min),
            ("sens_max", self.sens_max),
            ("sens_step", self.sens_step),
        ];
        if let Some((name, _)) = floats.iter().find(|(_, v)| !v.is_finite()) {
            return invalid(format!("{name} must be finite"));
        }
        if !self.min_interval_secs.is_finite() || self.min_interval_secs < 0.0 {
            return invalid("min_interval_secs must be a non-negative number".into());
        }
        if !self.bar_timeout_secs.is_finite() || self.bar_timeout_secs < 0.0 {
            return invalid("bar_timeout_secs must be a non-negative number".into());
        }

        if self.gain_min_db > self.gain_max_db {
            return invalid(format!(
                "gain range is inverted: {} > {}",
                self.gain_min_db, self.gain_max_db
            ));
        }
        if self.sens_min <= 0.0 {
            return invalid("sens_min must be positive".into());
        }
        if self.sens_min > self.sens_max {
            return invalid(format!(
                "sensitivity range is inverted: {} > {}",
                self.sens_min, self.sens_max
            ));
        }
        if !(self.gain_min_db..=self.gain_max_db).contains(&self.initial_gain_db) {
            return invalid(format!(
                "initial_gain_db {} outside [{}, {}]",
                self.initial_gain_db, self.gain_min_db, self.gain_max_db
            ));
        }
        if !(self.sens_min..=self.sens_max).contains(&self.sensitivity_multiplier) {
            return invalid(format!(
                "sensitivity_multiplier {} outside [{}, {}]",
                self.sensitivity_multiplier, self.sens_min, self.sens_max
            ));
        }

        Ok(())
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_secs_f64(self.min_interval_secs)
    }

    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_ms)
    }

    pub fn bar_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.bar_timeout_secs)
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.poll_hz.max(1) as f64)
    }
}
