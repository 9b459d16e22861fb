//! Acoustic voice-biomarker extraction and risk screening.
//!
//! Takes a short voice recording and produces a small set of acoustic
//! biomarkers (fundamental-frequency statistics, a roughness score, a mel
//! spectrogram for visualization) plus a categorical risk label derived from
//! fixed thresholds. This is a research/demo prototype, not a diagnostic
//! device; the thresholds are configuration constants, not clinically
//! validated values.
//!
//! ## Architecture
//!
//! ```text
//!  WAV bytes / raw capture buffer
//!             |
//!         AudioLoader        (decode, downmix, resample, cap duration)
//!             |
//!        AudioSample
//!       /     |      \
//!      v      v       v
//!   Pitch  Roughness  Spectrogram     (independent, run on scoped threads)
//!      \      |      /
//!       v     v     v
//!        BiomarkerSet
//!             |
//!       RiskClassifier
//!             |
//!       AnalysisReport
//! ```
//!
//! Each run owns its buffer exclusively; there is no shared mutable state
//! between concurrent invocations.

pub mod audio;
pub mod classify;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod pitch;
pub mod roughness;
pub mod spectrogram;


pub use audio::AudioSample;
pub use classify::{RiskAssessment, RiskCategory};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, DecodeError};
pub use pipeline::{analyze_sample, analyze_wav_bytes, AnalysisReport, BiomarkerSet};
pub use pitch::PitchTrack;
pub use spectrogram::SpectrogramMatrix;
