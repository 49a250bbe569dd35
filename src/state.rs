//! Display state driven by beat events and parameter changes

use crate::audio::BeatEvent;
use crate::params::{ParameterSnapshot, Range};
use std::time::{Duration, Instant};

/// Fixed-duration flash started by a beat
#[derive(Debug, Clone)]
pub struct FlashWindow {
    duration: Duration,
    lit_until: Option<Instant>,
}

impl FlashWindow {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            lit_until: None,
        }
    }

    /// Start (or restart) the flash at `now`.
    pub fn trigger(&mut self, now: Instant) {
        self.lit_until = Some(now + self.duration);
    }

    /// Trigger on any event that reported a beat. Returns whether one did.
    pub fn observe(&mut self, events: &[BeatEvent]) -> bool {
        match events.iter().rev().find(|e| e.occurred) {
            Some(event) => {
                self.trigger(event.timestamp);
                true
            }
            None => false,
        }
    }

    pub fn is_lit(&self, now: Instant) -> bool {
        self.lit_until.map(|until| now < until).unwrap_or(false)
    }
}

/// Gain/sensitivity bars shown for a while after a change
#[derive(Debug, Clone)]
pub struct ControlOverlay {
    timeout: Duration,
    visible_until: Option<Instant>,
    gain_range: Range,
    sensitivity_range: Range,
}

impl ControlOverlay {
    pub fn new(timeout: Duration, gain_range: Range, sensitivity_range: Range) -> Self {
        Self {
            timeout,
            visible_until: None,
            gain_range,
            sensitivity_range,
        }
    }

    /// Note a parameter change at `now`, keeping the bars up.
    pub fn touch(&mut self, now: Instant) {
        self.visible_until = Some(now + self.timeout);
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.visible_until.map(|until| now < until).unwrap_or(false)
    }

    /// Gain bar fill, 0..=1
    pub fn gain_ratio(&self, params: &ParameterSnapshot) -> f32 {
        self.gain_range.ratio(params.gain_db)
    }

    /// Sensitivity bar fill, 0..=1
    pub fn sensitivity_ratio(&self, params: &ParameterSnapshot) -> f32 {
        self.sensitivity_range.ratio(params.sensitivity_multiplier)
    }

    pub fn gain_label(params: &ParameterSnapshot) -> String {
        format!("Gain: {:.1} dB", params.gain_db)
    }

    pub fn sensitivity_label(params: &ParameterSnapshot) -> String {
        format!("Threshold: {:.2}x", params.sensitivity_multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(t: u64) -> Duration {
        Duration::from_millis(t)
    }

    fn event(occurred: bool, timestamp: Instant) -> BeatEvent {
        BeatEvent {
            occurred,
            timestamp,
            rolling_average_energy: 0.1,
        }
    }

    #[test]
    fn flash_is_dark_until_triggered() {
        let flash = FlashWindow::new(ms(120));
        assert!(!flash.is_lit(Instant::now()));
    }

    #[test]
    fn flash_lasts_for_its_duration() {
        let mut flash = FlashWindow::new(ms(120));
        let t = Instant::now();
        flash.trigger(t);

        assert!(flash.is_lit(t));
        assert!(flash.is_lit(t + ms(119)));
        assert!(!flash.is_lit(t + ms(120)));
    }

    #[test]
    fn retrigger_extends_the_flash() {
        let mut flash = FlashWindow::new(ms(100));
        let t = Instant::now();
        flash.trigger(t);
        flash.trigger(t + ms(80));

        assert!(flash.is_lit(t + ms(150)));
    }

    #[test]
    fn observe_only_triggers_on_beats() {
        let mut flash = FlashWindow::new(ms(100));
        let t = Instant::now();

        assert!(!flash.observe(&[event(false, t), event(false, t)]));
        assert!(!flash.is_lit(t));

        assert!(flash.observe(&[event(false, t), event(true, t + ms(5))]));
        assert!(flash.is_lit(t + ms(100)));
    }

    #[test]
    fn overlay_hides_after_timeout() {
        let mut overlay =
            ControlOverlay::new(ms(2000), Range::new(-20.0, 20.0), Range::new(1.0, 5.0));
        let t = Instant::now();
        assert!(!overlay.is_visible(t));

        overlay.touch(t);
        assert!(overlay.is_visible(t + ms(1999)));
        assert!(!overlay.is_visible(t + ms(2000)));
    }

    #[test]
    fn overlay_ratios_and_labels() {
        let overlay = ControlOverlay::new(ms(2000), Range::new(-20.0, 20.0), Range::new(1.0, 5.0));
        let params = ParameterSnapshot {
            gain_db: 10.0,
            sensitivity_multiplier: 2.0,
        };

        assert_eq!(overlay.gain_ratio(&params), 0.75);
        assert_eq!(overlay.sensitivity_ratio(&params), 0.25);
        assert_eq!(ControlOverlay::gain_label(&params), "Gain: 10.0 dB");
        assert_eq!(ControlOverlay::sensitivity_label(&params), "Threshold: 2.00x");
    }
}
