//! Consumer side of the capture hand-off
//!
//! ```text
//! audio callback ──push()──► CaptureQueue ──drain_all()──► SampleAccumulator
//!                                                               │ next_block()
//!                                                               ▼
//!                   BeatEvent ◄── BeatDetector ◄── rms() ◄── apply_gain()
//! ```

use super::{apply_gain, rms, BeatDetector, BeatEvent, CaptureQueue, SampleAccumulator};
use crate::config::BeatConfig;
use crate::params::ParameterStore;
use std::sync::Arc;
use std::time::Instant;

/// Drains captured audio and runs beat detection on every full block
pub struct BeatPipeline {
    queue: Arc<CaptureQueue>,
    params: Arc<ParameterStore>,
    accumulator: SampleAccumulator,
    detector: BeatDetector,
    last_energy: f32,
    blocks_processed: u64,
}

impl BeatPipeline {
    pub fn new(config: &BeatConfig, queue: Arc<CaptureQueue>, params: Arc<ParameterStore>) -> Self {
        let sensitivity = params.snapshot().sensitivity_multiplier;
        Self {
            queue,
            params,
            accumulator: SampleAccumulator::new(config.block_size),
            detector: BeatDetector::new(config.history_length, sensitivity, config.min_interval()),
            last_energy: 0.0,
            blocks_processed: 0,
        }
    }

    /// Process everything captured so far, stamped with the current time.
    pub fn poll(&mut self) -> Vec<BeatEvent> {
        self.poll_at(Instant::now())
    }

    /// Process everything captured so far, stamping each block with `now`.
    ///
    /// Returns one event per block processed; zero when less than a block
    /// has arrived since the previous call.
    pub fn poll_at(&mut self, now: Instant) -> Vec<BeatEvent> {
        self.accumulator.feed(self.queue.drain_all());

        let params = self.params.snapshot();
        self.detector.set_sensitivity(params.sensitivity_multiplier);

        let mut events = Vec::new();
        while let Some(block) = self.accumulator.next_block() {
            let energy = rms(apply_gain(&block, params.gain_db).samples());
            let event = self.detector.process(energy, now);
            if event.occurred {
                log::debug!(
                    "Beat: energy {:.4} vs average {:.4} (x{:.2})",
                    energy,
                    event.rolling_average_energy,
                    params.sensitivity_multiplier
                );
            }
            self.last_energy = energy;
            self.blocks_processed += 1;
            events.push(event);
        }
        events
    }

    /// Energy of the most recently processed block
    pub fn last_energy(&self) -> f32 {
        self.last_energy
    }

    pub fn blocks_processed(&self) -> u64 {
        self.blocks_processed
    }

    /// Samples waiting for the next block to fill
    pub fn pending_samples(&self) -> usize {
        self.accumulator.buffered()
    }

    pub fn detector(&self) -> &BeatDetector {
        &self.detector
    }

    pub fn params(&self) -> &Arc<ParameterStore> {
        &self.params
    }

    pub fn queue(&self) -> &Arc<CaptureQueue> {
        &self.queue
    }
}
