//! Analysis pipeline: decode, extract features in parallel, classify.
//!
//! The three extractors are pure functions of the same immutable
//! [`AudioSample`] with no data dependency on each other, so they run on
//! scoped threads and join before classification. Correctness does not
//! depend on the parallelism; processing cost is bounded by the duration cap
//! applied at load time.

use serde::{Deserialize, Serialize};
use std::thread::ScopedJoinHandle;
use tracing::{debug, info};

use crate::audio::AudioSample;
use crate::classify::{self, RiskAssessment};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::pitch::{self, PitchTrack};
use crate::roughness;
use crate::spectrogram::{SpectralRender, SpectrogramMatrix, SpectrogramRenderer};

/// Scalar biomarkers extracted from one recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomarkerSet {
    /// Mean F0 of the voiced frames in Hz; 0.0 when nothing was voiced.
    pub average_pitch: f32,
    /// Population standard deviation of the voiced pitch track in Hz.
    pub pitch_stddev: f32,
    /// Fraction of frames with a valid pitch estimate.
    pub voiced_ratio: f32,
    /// Scaled ZCR variance; always >= 0.
    pub roughness_score: f32,
    /// Mean spectral centroid in Hz; None for a signal with no energy.
    pub spectral_centroid: Option<f32>,
}

/// Complete result of one analysis run. Plain data, no UI/session context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub biomarkers: BiomarkerSet,
    pub pitch_track: PitchTrack,
    pub spectrogram: SpectrogramMatrix,
    pub risk: RiskAssessment,
}

/// Decode a WAV byte stream and run the full pipeline.
pub fn analyze_wav_bytes(
    bytes: &[u8],
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    let sample = AudioSample::from_wav_bytes(bytes, config)?;
    analyze_sample(&sample, config)
}

/// Run feature extraction and classification on a loaded sample.
pub fn analyze_sample(
    sample: &AudioSample,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    info!(
        duration_secs = sample.duration_secs(),
        sample_rate = sample.sample_rate(),
        "starting analysis"
    );

    let (track, roughness_score, render): (PitchTrack, f32, SpectralRender) =
        std::thread::scope(|scope| {
            let pitch_task = scope.spawn(|| pitch::estimate_track(sample, &config.pitch));
            let roughness_task =
                scope.spawn(|| roughness::roughness_score(sample, &config.roughness));
            let spectrogram_task = scope.spawn(|| {
                let mut renderer =
                    SpectrogramRenderer::new(config.spectrogram.clone(), sample.sample_rate());
                renderer.render(sample)
            });

            let track = join_stage(pitch_task, "pitch")?;
            let score = join_stage(roughness_task, "roughness")?;
            let render = join_stage(spectrogram_task, "spectrogram")??;
            Ok::<_, AnalysisError>((track, score, render))
        })?;

    let voiced = track.voiced_count();
    let pitch_stddev = if voiced >= config.pitch.min_voiced_frames {
        track.stddev()
    } else {
        0.0
    };

    let biomarkers = BiomarkerSet {
        average_pitch: track.average(),
        pitch_stddev,
        voiced_ratio: track.voiced_ratio(),
        roughness_score,
        spectral_centroid: render.spectral_centroid,
    };
    ensure_finite(&biomarkers, &render.matrix)?;

    if voiced == 0 {
        debug!("no voiced frames; statistics defaulted to zero");
    }

    let risk = classify::classify(&biomarkers, &config.classifier);
    info!(
        category = ?risk.category,
        score = risk.score,
        average_pitch = biomarkers.average_pitch,
        "analysis complete"
    );

    Ok(AnalysisReport {
        biomarkers,
        pitch_track: track,
        spectrogram: render.matrix,
        risk,
    })
}

fn join_stage<T>(handle: ScopedJoinHandle<'_, T>, stage: &str) -> Result<T, AnalysisError> {
    handle
        .join()
        .map_err(|_| AnalysisError::Computation(format!("{} stage panicked", stage)))
}

/// Guard against NaN/Infinity escaping the extractors.
fn ensure_finite(
    biomarkers: &BiomarkerSet,
    spectrogram: &SpectrogramMatrix,
) -> Result<(), AnalysisError> {
    let scalars = [
        ("average_pitch", biomarkers.average_pitch),
        ("pitch_stddev", biomarkers.pitch_stddev),
        ("voiced_ratio", biomarkers.voiced_ratio),
        ("roughness_score", biomarkers.roughness_score),
    ];
    for (name, value) in scalars {
        if !value.is_finite() {
            return Err(AnalysisError::Computation(format!(
                "non-finite {}: {}",
                name, value
            )));
        }
    }
    if let Some(centroid) = biomarkers.spectral_centroid {
        if !centroid.is_finite() {
            return Err(AnalysisError::Computation(format!(
                "non-finite spectral_centroid: {}",
                centroid
            )));
        }
    }
    if spectrogram.frames.iter().flatten().any(|v| !v.is_finite()) {
        return Err(AnalysisError::Computation(
            "non-finite spectrogram cell".to_string(),
        ));
    }
    Ok(())
}
