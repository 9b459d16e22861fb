//! Fundamental-frequency tracking.
//!
//! Runs a YIN detector over overlapping frames and keeps candidates inside
//! the configured vocal range. Frames with too little power, low clarity or
//! an out-of-range candidate are marked unvoiced rather than dropped, so the
//! track length depends only on sample count, frame size and hop size.

use pitch_detection::detector::yin::YINDetector;
use pitch_detection::detector::PitchDetector;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audio::AudioSample;
use crate::config::PitchConfig;

/// Per-frame F0 estimates; `None` marks an unvoiced frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PitchTrack {
    pub frames: Vec<Option<f32>>,
}

impl PitchTrack {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Iterator over voiced frames only.
    pub fn voiced(&self) -> impl Iterator<Item = f32> + '_ {
        self.frames.iter().filter_map(|f| *f)
    }

    pub fn voiced_count(&self) -> usize {
        self.voiced().count()
    }

    /// Fraction of frames with a valid pitch; 0.0 for an empty track.
    pub fn voiced_ratio(&self) -> f32 {
        if self.frames.is_empty() {
            return 0.0;
        }
        self.voiced_count() as f32 / self.frames.len() as f32
    }

    /// Mean of the voiced frames; defined as 0.0 when no frame is voiced.
    pub fn average(&self) -> f32 {
        let count = self.voiced_count();
        if count == 0 {
            return 0.0;
        }
        self.voiced().sum::<f32>() / count as f32
    }

    /// Population standard deviation of the voiced frames, in Hz; 0.0 when
    /// fewer than two frames are voiced.
    pub fn stddev(&self) -> f32 {
        let count = self.voiced_count();
        if count < 2 {
            return 0.0;
        }
        let mean = self.average();
        let variance = self.voiced().map(|f| (f - mean).powi(2)).sum::<f32>() / count as f32;
        variance.sqrt()
    }
}

/// Estimate the pitch track of an audio sample.
///
/// Input shorter than one frame yields an empty track; pure silence or noise
/// yields an all-unvoiced track. Neither is an error.
pub fn estimate_track(sample: &AudioSample, config: &PitchConfig) -> PitchTrack {
    let samples = sample.samples();
    let mut track = PitchTrack::default();
    if samples.len() < config.frame_size {
        return track;
    }

    let mut detector = YINDetector::new(config.frame_size, config.frame_size / 2);
    let sample_rate = sample.sample_rate() as usize;

    let mut start = 0;
    while start + config.frame_size <= samples.len() {
        let frame = &samples[start..start + config.frame_size];
        let estimate = detector
            .get_pitch(
                frame,
                sample_rate,
                config.power_threshold,
                config.clarity_threshold,
            )
            .map(|p| p.frequency)
            .filter(|f| *f >= config.fmin && *f <= config.fmax);
        track.frames.push(estimate);
        start += config.hop_size;
    }

    debug!(
        frames = track.len(),
        voiced = track.voiced_count(),
        "pitch track computed"
    );
    track
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use std::f32::consts::PI;

    fn sine_sample(freq: f32, sample_rate: u32, secs: f32) -> AudioSample {
        let n = (sample_rate as f32 * secs) as usize;
        let samples: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect();
        AudioSample::from_samples(&samples, sample_rate, &AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn test_sine_pitch_within_two_percent() {
        let config = PitchConfig::default();
        for freq in [100.0f32, 150.0, 220.0, 300.0] {
            let sample = sine_sample(freq, 16000, 1.0);
            let track = estimate_track(&sample, &config);
            let avg = track.average();
            assert!(
                (avg - freq).abs() / freq < 0.02,
                "expected ~{} Hz, got {}",
                freq,
                avg
            );
        }
    }

    #[test]
    fn test_silence_is_all_unvoiced() {
        let config = PitchConfig::default();
        let sample =
            AudioSample::from_samples(&vec![0.0f32; 16000], 16000, &AnalysisConfig::default())
                .unwrap();
        let track = estimate_track(&sample, &config);
        assert!(!track.is_empty());
        assert_eq!(track.voiced_count(), 0);
        assert_eq!(track.average(), 0.0);
        assert_eq!(track.stddev(), 0.0);
        assert_eq!(track.voiced_ratio(), 0.0);
    }

    #[test]
    fn test_frame_count_depends_only_on_geometry() {
        let config = PitchConfig::default();
        let silence =
            AudioSample::from_samples(&vec![0.0f32; 16000], 16000, &AnalysisConfig::default())
                .unwrap();
        let tone = sine_sample(200.0, 16000, 1.0);

        let silent_track = estimate_track(&silence, &config);
        let tone_track = estimate_track(&tone, &config);

        let expected = 1 + (16000 - config.frame_size) / config.hop_size;
        assert_eq!(silent_track.len(), expected);
        assert_eq!(tone_track.len(), expected);
    }

    #[test]
    fn test_input_shorter_than_frame_yields_empty_track() {
        let config = PitchConfig::default();
        let sample =
            AudioSample::from_samples(&vec![0.1f32; 100], 16000, &AnalysisConfig::default())
                .unwrap();
        let track = estimate_track(&sample, &config);
        assert!(track.is_empty());
        assert_eq!(track.average(), 0.0);
    }

    #[test]
    fn test_out_of_range_tone_is_unvoiced() {
        // 1 kHz is well above the configured fmax and must be rejected.
        let config = PitchConfig::default();
        let sample = sine_sample(1000.0, 16000, 1.0);
        let track = estimate_track(&sample, &config);
        assert_eq!(track.voiced_count(), 0);
    }

    #[test]
    fn test_varying_pitch_has_higher_stddev() {
        let config = PitchConfig::default();
        let steady = sine_sample(150.0, 16000, 1.0);

        let mut samples: Vec<f32> = Vec::new();
        for (freq, offset) in [(150.0f32, 0usize), (250.0, 8000)] {
            samples.extend((0..8000usize).map(|i| {
                (2.0 * PI * freq * (i + offset) as f32 / 16000.0).sin() * 0.5
            }));
        }
        let varying =
            AudioSample::from_samples(&samples, 16000, &AnalysisConfig::default()).unwrap();

        let steady_std = estimate_track(&steady, &config).stddev();
        let varying_std = estimate_track(&varying, &config).stddev();
        assert!(
            varying_std > steady_std + 10.0,
            "expected clearly higher stddev: steady {} vs varying {}",
            steady_std,
            varying_std
        );
    }
}
