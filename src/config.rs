//! Configuration for the analysis pipeline.
//!
//! Every tuning constant the pipeline uses lives here so that one configurable
//! chain replaces per-experiment copies of the analysis code. The thresholds
//! and scale factors are demo tuning values observed to produce readable
//! output ranges; none of them is derived from clinical data.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Maximum audio length in seconds; longer input is truncated.
    pub max_duration_secs: f32,
    /// Sample rate all input is resampled to before analysis.
    pub target_sample_rate: u32,
    pub pitch: PitchConfig,
    pub roughness: RoughnessConfig,
    pub spectrogram: SpectrogramConfig,
    pub classifier: ClassifierConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: 30.0,
            target_sample_rate: 16000,
            pitch: PitchConfig::default(),
            roughness: RoughnessConfig::default(),
            spectrogram: SpectrogramConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Profile for sustained-vowel recordings ("say aaah"): short cap, narrow
    /// pitch band, roughness scaled into a 0-200 display range.
    pub fn sustained_vowel() -> Self {
        Self {
            max_duration_secs: 10.0,
            pitch: PitchConfig {
                fmin: 50.0,
                fmax: 300.0,
                ..PitchConfig::default()
            },
            roughness: RoughnessConfig {
                tremor_scale_factor: 10000.0,
                ..RoughnessConfig::default()
            },
            classifier: ClassifierConfig {
                valid_pitch_range: (50.0, 300.0),
                risk_threshold: 80.0,
                metric: RiskMetric::ZcrVariance,
            },
            ..Self::default()
        }
    }

    /// Profile for free conversational speech: longer cap, wider pitch search,
    /// risk driven by pitch variability instead of ZCR variance.
    pub fn conversational() -> Self {
        Self {
            max_duration_secs: 30.0,
            pitch: PitchConfig {
                fmin: 60.0,
                fmax: 400.0,
                ..PitchConfig::default()
            },
            roughness: RoughnessConfig {
                tremor_scale_factor: 1000.0,
                ..RoughnessConfig::default()
            },
            classifier: ClassifierConfig {
                valid_pitch_range: (85.0, 255.0),
                risk_threshold: 8.0,
                metric: RiskMetric::PitchStdDev,
            },
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        let config: AnalysisConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file {:?}", path))?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save_json_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write config file {:?}", path))?;
        Ok(())
    }

    /// Maximum number of samples retained at the target sample rate.
    pub fn max_samples(&self) -> usize {
        (self.max_duration_secs * self.target_sample_rate as f32).round() as usize
    }
}

/// Fundamental-frequency tracking parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitchConfig {
    /// Lower bound of the pitch search in Hz.
    pub fmin: f32,
    /// Upper bound of the pitch search in Hz.
    pub fmax: f32,
    /// Analysis frame size in samples (~64ms at 16kHz).
    pub frame_size: usize,
    /// Hop between frames in samples (50% overlap).
    pub hop_size: usize,
    /// Minimum in-frame signal power for a frame to count as voiced.
    pub power_threshold: f32,
    /// Minimum detector clarity for a pitch candidate to be accepted.
    pub clarity_threshold: f32,
    /// Voiced frames required before the pitch standard deviation is trusted.
    pub min_voiced_frames: usize,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            fmin: 50.0,
            fmax: 400.0,
            frame_size: 1024,
            hop_size: 512,
            power_threshold: 0.8,
            clarity_threshold: 0.5,
            min_voiced_frames: 5,
        }
    }
}

/// Roughness (ZCR-variance) parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoughnessConfig {
    /// Analysis frame size in samples.
    pub frame_size: usize,
    /// Hop between frames in samples.
    pub hop_size: usize,
    /// Multiplier mapping the raw ZCR variance (order 1e-4 to 1e-2) into a
    /// readable range. Rough bands at x10000: ~1-20 healthy sustained tone,
    /// ~30-60 normal speech, ~100-200 rough/tremor.
    pub tremor_scale_factor: f32,
}

impl Default for RoughnessConfig {
    fn default() -> Self {
        Self {
            frame_size: 1024,
            hop_size: 512,
            tremor_scale_factor: 10000.0,
        }
    }
}

/// Mel spectrogram parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectrogramConfig {
    /// FFT size.
    pub n_fft: usize,
    /// Hop length between frames (in samples).
    pub hop_length: usize,
    /// Window length (in samples).
    pub win_length: usize,
    /// Number of mel frequency bands.
    pub n_mels: usize,
    /// Minimum frequency for the mel filterbank (Hz).
    pub fmin: f32,
    /// Maximum frequency for the mel filterbank (Hz); clamped to Nyquist.
    pub fmax: f32,
    /// Dynamic range floor below the peak, in dB.
    pub top_db: f32,
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            n_fft: 512,
            hop_length: 160, // 10ms at 16kHz
            win_length: 400, // 25ms at 16kHz
            n_mels: 80,
            fmin: 20.0,
            fmax: 7600.0,
            top_db: 80.0,
        }
    }
}

/// Which biomarker drives the Elevated/Normal decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskMetric {
    /// Scaled variance of the per-frame zero-crossing rate.
    ZcrVariance,
    /// Standard deviation of the voiced pitch track in Hz.
    PitchStdDev,
}

/// Risk classification parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Exclusive bounds for a plausible average pitch; anything outside is
    /// judged too unclear/silent to assess and yields Inconclusive.
    pub valid_pitch_range: (f32, f32),
    /// Decision boundary between Normal and Elevated (strict greater-than).
    pub risk_threshold: f32,
    /// Biomarker compared against the threshold.
    pub metric: RiskMetric,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            valid_pitch_range: (50.0, 400.0),
            risk_threshold: 80.0,
            metric: RiskMetric::ZcrVariance,
        }
    }
}
