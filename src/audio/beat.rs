//! Adaptive energy beat detection
//!
//! Each block's energy is compared against the mean of the previous
//! `history_length` block energies scaled by a sensitivity multiplier.
//! Detection stays disarmed until the history is full, a silent history
//! (mean of zero) never triggers, and a refractory interval keeps one
//! sustained transient from firing repeatedly.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Per-block detection result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatEvent {
    /// Beat detected on this block
    pub occurred: bool,

    /// Time the block was processed
    pub timestamp: Instant,

    /// Mean energy of the history the block was judged against
    pub rolling_average_energy: f32,
}

/// Energy-history beat detector
pub struct BeatDetector {
    history: VecDeque<f32>,
    history_length: usize,
    sensitivity: f32,
    min_interval: Duration,
    last_beat: Option<Instant>,
}

impl BeatDetector {
    /// Create a detector with an empty history.
    ///
    /// `sensitivity` is taken as-is; callers keep it positive.
    pub fn new(history_length: usize, sensitivity: f32, min_interval: Duration) -> Self {
        let history_length = history_length.max(1);
        Self {
            history: VecDeque::with_capacity(history_length + 1),
            history_length,
            sensitivity,
            min_interval,
            last_beat: None,
        }
    }

    /// Judge one block energy observed at `now`.
    pub fn process(&mut self, energy: f32, now: Instant) -> BeatEvent {
        let avg = self.average();

        let mut beat = false;
        if self.is_armed() && avg > 0.0 && energy > avg * self.sensitivity {
            let rested = self
                .last_beat
                .map(|last| now.saturating_duration_since(last) >= self.min_interval)
                .unwrap_or(true);
            if rested {
                beat = true;
                self.last_beat = Some(now);
            }
        }

        // The block joins the history only after it has been judged
        self.history.push_back(energy);
        if self.history.len() > self.history_length {
            self.history.pop_front();
        }

        BeatEvent {
            occurred: beat,
            timestamp: now,
            rolling_average_energy: avg,
        }
    }

    /// Mean of the current history, 0 when empty
    pub fn average(&self) -> f32 {
        if self.history.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.history.iter().map(|&e| e as f64).sum();
        (sum / self.history.len() as f64) as f32
    }

    /// True once a full history has been observed
    pub fn is_armed(&self) -> bool {
        self.history.len() >= self.history_length
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_length(&self) -> usize {
        self.history_length
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = sensitivity;
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn last_beat(&self) -> Option<Instant> {
        self.last_beat
    }

    /// Forget the history and the last beat time.
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_beat = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(t: u64) -> Duration {
        Duration::from_millis(t)
    }

    #[test]
    fn history_never_exceeds_its_length() {
        let mut detector = BeatDetector::new(5, 2.0, ms(0));
        let start = Instant::now();

        for n in 1..=20u64 {
            detector.process(n as f32, start + ms(n));
            assert_eq!(detector.history_len(), (n as usize).min(5));
        }
    }

    #[test]
    fn stays_quiet_until_history_is_full() {
        let mut detector = BeatDetector::new(10, 1.5, ms(0));
        let start = Instant::now();

        for n in 0..9u64 {
            let energy = if n == 0 { 0.01 } else { 1000.0 * n as f32 };
            let event = detector.process(energy, start + ms(n * 20));
            assert!(!event.occurred, "beat reported while disarmed at call {n}");
        }
        assert!(!detector.is_armed());
    }

    #[test]
    fn refractory_period_suppresses_second_beat() {
        let mut detector = BeatDetector::new(4, 2.0, ms(120));
        let start = Instant::now();
        for n in 0..4u64 {
            detector.process(1.0, start + ms(n * 23));
        }

        let t1 = start + ms(200);
        let first = detector.process(10.0, t1);
        let second = detector.process(10.0, t1 + ms(50));

        assert!(first.occurred);
        assert!(!second.occurred);
        assert_eq!(detector.last_beat(), Some(t1));
    }

    #[test]
    fn beat_fires_again_once_interval_has_elapsed() {
        let mut detector = BeatDetector::new(4, 2.0, ms(100));
        let start = Instant::now();
        for n in 0..4u64 {
            detector.process(1.0, start + ms(n));
        }

        assert!(detector.process(10.0, start + ms(10)).occurred);
        // Refill a quiet baseline so the next hit clears the threshold again
        for n in 0..4u64 {
            detector.process(1.0, start + ms(20 + n));
        }
        assert!(detector.process(10.0, start + ms(110)).occurred);
    }

    #[test]
    fn silent_history_never_triggers() {
        let mut detector = BeatDetector::new(3, 1.0, ms(0));
        let start = Instant::now();
        for n in 0..3u64 {
            detector.process(0.0, start + ms(n));
        }

        let event = detector.process(5.0, start + ms(10));
        assert!(!event.occurred);
        assert_eq!(event.rolling_average_energy, 0.0);
    }

    #[test]
    fn reference_scenario_with_two_block_history() {
        let mut detector = BeatDetector::new(2, 2.0, ms(0));
        let start = Instant::now();

        assert!(!detector.process(1.0, start).occurred);
        assert!(!detector.process(1.0, start + ms(1)).occurred);

        let third = detector.process(1.0, start + ms(2));
        assert!(!third.occurred);
        assert_eq!(third.rolling_average_energy, 1.0);
        assert_eq!(detector.history_len(), 2);

        let fourth = detector.process(10.0, start + ms(3));
        assert!(fourth.occurred);
        assert_eq!(fourth.rolling_average_energy, 1.0);
    }

    #[test]
    fn current_block_does_not_bias_its_own_threshold() {
        // Judged against [1, 1] the threshold is 2; judged against [1, 3]
        // it would be 4 and the hit would be missed.
        let mut detector = BeatDetector::new(2, 2.0, ms(0));
        let start = Instant::now();
        detector.process(1.0, start);
        detector.process(1.0, start);

        let event = detector.process(3.0, start);
        assert!(event.occurred);
        assert_eq!(event.rolling_average_energy, 1.0);
    }

    #[test]
    fn threshold_must_be_strictly_exceeded() {
        let mut detector = BeatDetector::new(2, 2.0, ms(0));
        let start = Instant::now();
        detector.process(1.0, start);
        detector.process(1.0, start);

        assert!(!detector.process(2.0, start).occurred);
    }

    #[test]
    fn lower_sensitivity_detects_smaller_hits() {
        let start = Instant::now();
        let mut strict = BeatDetector::new(3, 3.0, ms(0));
        let mut loose = BeatDetector::new(3, 1.2, ms(0));
        for detector in [&mut strict, &mut loose] {
            for _ in 0..3 {
                detector.process(1.0, start);
            }
        }

        assert!(!strict.process(2.0, start).occurred);
        assert!(loose.process(2.0, start).occurred);
    }

    #[test]
    fn sensitivity_can_change_between_blocks() {
        let mut detector = BeatDetector::new(2, 5.0, ms(0));
        let start = Instant::now();
        detector.process(1.0, start);
        detector.process(1.0, start);
        assert!(!detector.process(3.0, start).occurred);

        detector.set_sensitivity(1.5);
        // History is now [1, 3], average 2, threshold 3
        assert!(detector.process(3.5, start).occurred);
    }

    #[test]
    fn event_carries_timestamp_and_average() {
        let mut detector = BeatDetector::new(2, 2.0, ms(0));
        let t = Instant::now();
        let first = detector.process(0.4, t);
        assert_eq!(first.timestamp, t);
        assert_eq!(first.rolling_average_energy, 0.0);

        let second = detector.process(0.8, t + ms(5));
        assert_eq!(second.rolling_average_energy, 0.4);
    }

    #[test]
    fn reset_disarms_and_clears_last_beat() {
        let mut detector = BeatDetector::new(2, 2.0, ms(0));
        let t = Instant::now();
        detector.process(1.0, t);
        detector.process(1.0, t);
        assert!(detector.process(10.0, t).occurred);

        detector.reset();
        assert_eq!(detector.history_len(), 0);
        assert!(detector.last_beat().is_none());
        assert!(!detector.is_armed());
    }
}
