//! Mel spectrogram rendering for visualization.
//!
//! Short-time Fourier transform projected onto a triangular mel filterbank,
//! with power converted to decibels referenced to the loudest cell, so the
//! matrix maximum is 0 dB by construction. Purely derived data; nothing in
//! the classification path depends on it.

use std::f32::consts::PI;
use std::sync::Arc;

use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audio::AudioSample;
use crate::config::SpectrogramConfig;
use crate::error::AnalysisError;

/// Floor for power values before taking the log.
const POWER_FLOOR: f32 = 1e-10;

/// Decibel-scaled mel spectrogram, peak-referenced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectrogramMatrix {
    /// Time-major frames; each inner vector holds `n_bands` dB values <= 0.
    pub frames: Vec<Vec<f32>>,
    /// Number of mel bands per frame.
    pub n_bands: usize,
    /// Hop between frames in samples, for time-axis reconstruction.
    pub hop_length: usize,
    /// Sample rate the spectrogram was computed at.
    pub sample_rate: u32,
}

impl SpectrogramMatrix {
    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    /// dB value at (frequency band, time frame).
    pub fn db(&self, band: usize, frame: usize) -> f32 {
        self.frames[frame][band]
    }

    /// Largest cell value; 0.0 for any non-empty rendering.
    pub fn max_db(&self) -> f32 {
        self.frames
            .iter()
            .flatten()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }
}

/// Result of one spectrogram pass: the matrix plus the mean spectral
/// centroid of the underlying linear spectra (None when no frame carries
/// measurable energy).
#[derive(Debug, Clone)]
pub struct SpectralRender {
    pub matrix: SpectrogramMatrix,
    pub spectral_centroid: Option<f32>,
}

/// Spectrogram renderer with pre-computed window, filterbank and FFT plan.
pub struct SpectrogramRenderer {
    config: SpectrogramConfig,
    sample_rate: u32,
    fft: Arc<dyn RealToComplex<f32>>,
    filterbank: Vec<Vec<f32>>,
    window: Vec<f32>,
    fft_input: Vec<f32>,
    fft_output: Vec<Complex<f32>>,
}

impl SpectrogramRenderer {
    pub fn new(config: SpectrogramConfig, sample_rate: u32) -> Self {
        let window = hann_window(config.win_length);

        let nyquist = sample_rate as f32 / 2.0;
        let filterbank = mel_filterbank(
            config.n_mels,
            config.n_fft / 2 + 1,
            sample_rate as f32,
            config.fmin.min(nyquist),
            config.fmax.min(nyquist),
        );

        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(config.n_fft);

        let fft_input = vec![0.0f32; config.n_fft];
        let fft_output = vec![Complex::new(0.0, 0.0); config.n_fft / 2 + 1];

        Self {
            config,
            sample_rate,
            fft,
            filterbank,
            window,
            fft_input,
            fft_output,
        }
    }

    /// Render the mel spectrogram of a sample and measure its mean spectral
    /// centroid from the same linear power spectra.
    pub fn render(&mut self, sample: &AudioSample) -> Result<SpectralRender, AnalysisError> {
        let audio = sample.samples();
        let n_frames = if audio.len() >= self.config.win_length {
            1 + (audio.len() - self.config.win_length) / self.config.hop_length
        } else {
            1
        };

        // Frequency of each FFT bin, for the centroid.
        let bin_hz = self.sample_rate as f32 / self.config.n_fft as f32;

        let mut power_frames: Vec<Vec<f32>> = Vec::with_capacity(n_frames);
        let mut centroid_sum = 0.0f64;
        let mut centroid_frames = 0usize;

        for frame_idx in 0..n_frames {
            let start = frame_idx * self.config.hop_length;
            let end = (start + self.config.win_length).min(audio.len());

            self.fft_input.fill(0.0);
            for (i, &s) in audio[start..end].iter().enumerate() {
                self.fft_input[i] = s * self.window[i];
            }

            self.fft
                .process(&mut self.fft_input, &mut self.fft_output)
                .map_err(|e| AnalysisError::Computation(format!("FFT failed: {}", e)))?;

            let power_spec: Vec<f32> = self
                .fft_output
                .iter()
                .map(|c| c.re * c.re + c.im * c.im)
                .collect();

            let total: f32 = power_spec.iter().sum();
            if total > POWER_FLOOR {
                let weighted: f32 = power_spec
                    .iter()
                    .enumerate()
                    .map(|(k, p)| k as f32 * bin_hz * p)
                    .sum();
                centroid_sum += (weighted / total) as f64;
                centroid_frames += 1;
            }

            let mel_frame: Vec<f32> = self
                .filterbank
                .iter()
                .map(|filter| {
                    filter
                        .iter()
                        .zip(power_spec.iter())
                        .map(|(w, p)| w * p)
                        .sum()
                })
                .collect();
            power_frames.push(mel_frame);
        }

        let matrix = self.to_db(power_frames);
        let spectral_centroid = if centroid_frames > 0 {
            Some((centroid_sum / centroid_frames as f64) as f32)
        } else {
            None
        };

        debug!(
            frames = matrix.n_frames(),
            bands = matrix.n_bands,
            centroid = ?spectral_centroid,
            "spectrogram rendered"
        );

        Ok(SpectralRender {
            matrix,
            spectral_centroid,
        })
    }

    /// Convert mel power frames to peak-referenced dB.
    ///
    /// The reference is the matrix-wide maximum, so the loudest cell is
    /// exactly 0 dB and everything else is negative, floored at `-top_db`.
    fn to_db(&self, power_frames: Vec<Vec<f32>>) -> SpectrogramMatrix {
        let reference = power_frames
            .iter()
            .flatten()
            .copied()
            .fold(POWER_FLOOR, f32::max);

        let frames: Vec<Vec<f32>> = power_frames
            .into_iter()
            .map(|frame| {
                frame
                    .into_iter()
                    .map(|p| {
                        let db = 10.0 * (p.max(POWER_FLOOR) / reference).log10();
                        db.max(-self.config.top_db)
                    })
                    .collect()
            })
            .collect();

        SpectrogramMatrix {
            frames,
            n_bands: self.config.n_mels,
            hop_length: self.config.hop_length,
            sample_rate: self.sample_rate,
        }
    }
}

fn hann_window(len: usize) -> Vec<f32> {
    if len < 2 {
        return vec![1.0; len];
    }
    (0..len)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (len - 1) as f32).cos()))
        .collect()
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filterbank: `n_mels` filters over `n_bins` FFT bins.
fn mel_filterbank(
    n_mels: usize,
    n_bins: usize,
    sample_rate: f32,
    fmin: f32,
    fmax: f32,
) -> Vec<Vec<f32>> {
    let mel_lo = hz_to_mel(fmin);
    let mel_hi = hz_to_mel(fmax);

    // n_mels + 2 band edges, equally spaced in mel, mapped to bin positions.
    let edges: Vec<f32> = (0..=n_mels + 1)
        .map(|i| {
            let mel = mel_lo + (mel_hi - mel_lo) * i as f32 / (n_mels + 1) as f32;
            (n_bins as f32 - 1.0) * mel_to_hz(mel) / (sample_rate / 2.0)
        })
        .collect();

    (0..n_mels)
        .map(|m| {
            let (left, center, right) = (edges[m], edges[m + 1], edges[m + 2]);
            (0..n_bins)
                .map(|bin| {
                    let b = bin as f32;
                    if b >= left && b < center {
                        (b - left) / (center - left)
                    } else if b >= center && b <= right {
                        (right - b) / (right - center)
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;

    fn sample_from(samples: Vec<f32>) -> AudioSample {
        AudioSample::from_samples(&samples, 16000, &AnalysisConfig::default()).unwrap()
    }

    fn sine(freq: f32, secs: f32) -> Vec<f32> {
        let n = (16000.0 * secs) as usize;
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / 16000.0).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_mel_scale_roundtrip() {
        for hz in [50.0f32, 150.0, 1000.0, 4000.0, 7600.0] {
            let back = mel_to_hz(hz_to_mel(hz));
            assert!((hz - back).abs() < 1e-2, "roundtrip failed for {} Hz", hz);
        }
    }

    #[test]
    fn test_filterbank_shape_and_weights() {
        let fb = mel_filterbank(80, 257, 16000.0, 20.0, 7600.0);
        assert_eq!(fb.len(), 80);
        for filter in &fb {
            assert_eq!(filter.len(), 257);
            assert!(filter.iter().all(|&w| w >= 0.0));
            assert!(filter.iter().sum::<f32>() > 0.0);
        }
    }

    #[test]
    fn test_peak_is_zero_db() {
        let mut renderer = SpectrogramRenderer::new(SpectrogramConfig::default(), 16000);
        let render = renderer.render(&sample_from(sine(440.0, 1.0))).unwrap();
        let matrix = render.matrix;

        assert!((matrix.max_db() - 0.0).abs() < 1e-4);
        assert!(matrix.frames.iter().flatten().all(|&v| v <= 1e-4));
    }

    #[test]
    fn test_silence_renders_without_error() {
        let mut renderer = SpectrogramRenderer::new(SpectrogramConfig::default(), 16000);
        let render = renderer.render(&sample_from(vec![0.0; 16000])).unwrap();

        // Peak-referenced even for silence: max is still 0 dB by construction.
        assert!((render.matrix.max_db() - 0.0).abs() < 1e-4);
        assert!(render.spectral_centroid.is_none());
    }

    #[test]
    fn test_frame_count_formula() {
        let config = SpectrogramConfig::default();
        let mut renderer = SpectrogramRenderer::new(config.clone(), 16000);
        let render = renderer.render(&sample_from(vec![0.0; 16000])).unwrap();

        let expected = 1 + (16000 - config.win_length) / config.hop_length;
        assert_eq!(render.matrix.n_frames(), expected);
        assert_eq!(render.matrix.n_bands, config.n_mels);
    }

    #[test]
    fn test_dynamic_range_floor() {
        let config = SpectrogramConfig::default();
        let mut renderer = SpectrogramRenderer::new(config.clone(), 16000);
        let render = renderer.render(&sample_from(sine(440.0, 1.0))).unwrap();

        let min = render
            .matrix
            .frames
            .iter()
            .flatten()
            .copied()
            .fold(f32::INFINITY, f32::min);
        assert!(min >= -config.top_db - 1e-4);
    }

    #[test]
    fn test_centroid_tracks_tone_frequency() {
        let mut renderer = SpectrogramRenderer::new(SpectrogramConfig::default(), 16000);

        let low = renderer.render(&sample_from(sine(300.0, 1.0))).unwrap();
        let high = renderer.render(&sample_from(sine(3000.0, 1.0))).unwrap();

        let low_c = low.spectral_centroid.unwrap();
        let high_c = high.spectral_centroid.unwrap();
        assert!(
            high_c > low_c + 1000.0,
            "centroid should rise with frequency: {} vs {}",
            low_c,
            high_c
        );
    }
}
