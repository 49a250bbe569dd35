//! Audio capture and beat analysis module

mod accumulator;
mod beat;
mod capture;
mod dsp;
mod pipeline;
mod queue;
mod sources;

pub use accumulator::{AudioBlock, SampleAccumulator};
pub use beat::{BeatDetector, BeatEvent};
pub use capture::{mix_to_mono, AudioCaptureHandle, CaptureError, CaptureInfo};
pub use dsp::{apply_gain, db_to_linear, rms};
pub use pipeline::BeatPipeline;
pub use queue::{CaptureQueue, CaptureStats, CaptureStatsSnapshot};
pub use sources::{list_sources, AudioSource, SourceError};
