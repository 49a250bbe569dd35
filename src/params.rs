//! Runtime-adjustable gain and sensitivity

use crate::config::BeatConfig;
use parking_lot::Mutex;

/// Consistent copy of the live parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSnapshot {
    pub gain_db: f32,
    pub sensitivity_multiplier: f32,
}

/// Inclusive bounds for one parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    /// Bounds given in either order are normalised to `min <= max`.
    pub fn new(a: f32, b: f32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Clamp `value` into the range; NaN collapses to `min`.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    /// Position of `value` within the range as 0..=1
    pub fn ratio(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Shared store for gain and sensitivity.
///
/// Both values sit behind one lock so a reader never sees a half-applied
/// update. Every write is clamped; nothing out of range gets through.
pub struct ParameterStore {
    current: Mutex<ParameterSnapshot>,
    gain_range: Range,
    sensitivity_range: Range,
}

impl ParameterStore {
    pub fn new(initial: ParameterSnapshot, gain_range: Range, sensitivity_range: Range) -> Self {
        let initial = ParameterSnapshot {
            gain_db: gain_range.clamp(initial.gain_db),
            sensitivity_multiplier: sensitivity_range.clamp(initial.sensitivity_multiplier),
        };
        Self {
            current: Mutex::new(initial),
            gain_range,
            sensitivity_range,
        }
    }

    pub fn from_config(config: &BeatConfig) -> Self {
        Self::new(
            ParameterSnapshot {
                gain_db: config.initial_gain_db,
                sensitivity_multiplier: config.sensitivity_multiplier,
            },
            Range::new(config.gain_min_db, config.gain_max_db),
            Range::new(config.sens_min, config.sens_max),
        )
    }

    pub fn snapshot(&self) -> ParameterSnapshot {
        *self.current.lock()
    }

    /// Shift the gain by `delta_db`, clamped. Returns the new snapshot.
    pub fn adjust_gain(&self, delta_db: f32) -> ParameterSnapshot {
        let mut current = self.current.lock();
        current.gain_db = self.gain_range.clamp(current.gain_db + delta_db);
        *current
    }

    /// Shift the sensitivity multiplier by `delta`, clamped. Returns the new snapshot.
    pub fn adjust_sensitivity(&self, delta: f32) -> ParameterSnapshot {
        let mut current = self.current.lock();
        current.sensitivity_multiplier = self
            .sensitivity_range
            .clamp(current.sensitivity_multiplier + delta);
        *current
    }

    pub fn gain_range(&self) -> Range {
        self.gain_range
    }

    pub fn sensitivity_range(&self) -> Range {
        self.sensitivity_range
    }
}
