//! Roughness scoring from short-time zero-crossing statistics.
//!
//! The per-frame zero-crossing rate of a steady voiced tone is nearly
//! constant; breathy or tremulous phonation makes it fluctuate. The variance
//! of the ZCR sequence, scaled into a readable range, serves as a jitter
//! proxy. It is not a clinically defined jitter measure.

use tracing::debug;

use crate::audio::AudioSample;
use crate::config::RoughnessConfig;

/// Fraction of sign changes within a frame, normalized by frame length.
pub fn zero_crossing_rate(frame: &[f32]) -> f32 {
    if frame.len() < 2 {
        return 0.0;
    }
    let crossings = frame
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();
    crossings as f32 / frame.len() as f32
}

/// Scaled variance of the per-frame ZCR across the whole sample.
///
/// Always non-negative. A silent or constant signal has no sign changes in
/// any frame, so the variance and the score are exactly 0 -- a valid result
/// meaning "no measurable roughness", not an error.
pub fn roughness_score(sample: &AudioSample, config: &RoughnessConfig) -> f32 {
    let samples = sample.samples();
    let mut rates = Vec::new();

    let mut start = 0;
    while start + config.frame_size <= samples.len() {
        rates.push(zero_crossing_rate(&samples[start..start + config.frame_size]));
        start += config.hop_size;
    }

    if rates.is_empty() {
        return 0.0;
    }

    let mean = rates.iter().sum::<f32>() / rates.len() as f32;
    let variance = rates.iter().map(|r| (r - mean).powi(2)).sum::<f32>() / rates.len() as f32;
    let score = variance * config.tremor_scale_factor;

    debug!(frames = rates.len(), score, "roughness computed");
    score
}
