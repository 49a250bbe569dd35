//! Gain staging and block energy

use super::AudioBlock;

/// Convert decibels to a linear amplitude factor
pub fn db_to_linear(gain_db: f32) -> f32 {
    10.0_f32.powf(gain_db / 20.0)
}

/// Scale every sample of `block` by `gain_db` decibels.
pub fn apply_gain(block: &AudioBlock, gain_db: f32) -> AudioBlock {
    let gain = db_to_linear(gain_db);
    AudioBlock::new(block.samples().iter().map(|&s| s * gain).collect())
}

/// Root-mean-square of `samples`, accumulated in f64.
///
/// Returns 0 for an empty slice.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples
        .iter()
        .map(|&s| {
            let s = s as f64;
            s * s
        })
        .sum();
    (sum_sq / samples.len() as f64).sqrt() as f32
}
