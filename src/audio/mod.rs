//! Audio input handling: decoding, downmix, resampling, duration cap.

mod loader;
mod resampler;

pub use resampler::resample;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::DecodeError;

/// Mono sample buffer at a known sample rate, truncated to the configured
/// maximum duration. Immutable input shared by all feature extractors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSample {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioSample {
    /// Decode a WAV byte stream into an analysis-ready buffer.
    pub fn from_wav_bytes(bytes: &[u8], config: &AnalysisConfig) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::EmptyPayload);
        }
        let (samples, source_rate) = loader::decode_wav(bytes)?;
        Self::from_samples(&samples, source_rate, config)
    }

    /// Build from a pre-decoded mono capture buffer at an arbitrary rate.
    ///
    /// Callers with containers this crate does not decode natively (e.g. MP3)
    /// decode with their own codec and enter the pipeline here.
    pub fn from_samples(
        samples: &[f32],
        source_rate: u32,
        config: &AnalysisConfig,
    ) -> Result<Self, DecodeError> {
        if samples.is_empty() {
            return Err(DecodeError::EmptyPayload);
        }
        if source_rate == 0 {
            return Err(DecodeError::Malformed("sample rate of zero".to_string()));
        }

        // Cap at the source rate first so the resampler never sees more work
        // than the duration cap allows.
        let max_source = (config.max_duration_secs * source_rate as f32).round() as usize;
        let capped = &samples[..samples.len().min(max_source)];

        let mut resampled = if source_rate == config.target_sample_rate {
            capped.to_vec()
        } else {
            resample(capped, source_rate, config.target_sample_rate)?
        };
        resampled.truncate(config.max_samples());

        debug!(
            source_rate,
            target_rate = config.target_sample_rate,
            samples = resampled.len(),
            "audio loaded"
        );

        Ok(Self {
            samples: resampled,
            sample_rate: config.target_sample_rate,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Effective duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}
