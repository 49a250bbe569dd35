//! Keyboard-style controls for gain and sensitivity

use crate::params::{ParameterSnapshot, ParameterStore};
use std::str::FromStr;

/// A user control action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    GainUp,
    GainDown,
    /// Raise the threshold multiplier (fewer beats)
    SensitivityUp,
    /// Lower the threshold multiplier (more beats)
    SensitivityDown,
    Quit,
}

impl FromStr for Control {
    type Err = String;

    /// Accepts arrow-key names and a few aliases, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" | "+" | "gain+" => Ok(Control::GainUp),
            "down" | "-" | "gain-" => Ok(Control::GainDown),
            "right" | ">" | "sens+" => Ok(Control::SensitivityUp),
            "left" | "<" | "sens-" => Ok(Control::SensitivityDown),
            "q" | "quit" | "esc" | "escape" => Ok(Control::Quit),
            other => Err(format!("unknown control: {other:?}")),
        }
    }
}

/// Step sizes for each control
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSteps {
    pub gain_db: f32,
    pub sensitivity: f32,
}

impl Control {
    /// Apply to the store. Returns the new snapshot, or `None` for `Quit`.
    pub fn apply(self, store: &ParameterStore, steps: ControlSteps) -> Option<ParameterSnapshot> {
        let snapshot = match self {
            Control::GainUp => store.adjust_gain(steps.gain_db),
            Control::GainDown => store.adjust_gain(-steps.gain_db),
            Control::SensitivityUp => store.adjust_sensitivity(steps.sensitivity),
            Control::SensitivityDown => store.adjust_sensitivity(-steps.sensitivity),
            Control::Quit => return None,
        };
        log::info!(
            "{:?}: gain {:.1} dB, threshold x{:.2}",
            self,
            snapshot.gain_db,
            snapshot.sensitivity_multiplier
        );
        Some(snapshot)
    }
}
