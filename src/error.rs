//! Error taxonomy for the analysis pipeline.
//!
//! Only two conditions are terminal: undecodable input and unexpected
//! numerical failures. Silence, out-of-range pitch and zero variance are
//! valid results and flow into the Inconclusive/Normal classification path
//! instead of erroring.

use thiserror::Error;

/// Input could not be turned into a usable sample buffer.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("empty audio payload")]
    EmptyPayload,

    #[error("unsupported container format (expected WAV, or supply a pre-decoded buffer)")]
    UnsupportedFormat,

    #[error("malformed audio stream: {0}")]
    Malformed(String),

    #[error("resampling failed: {0}")]
    Resample(String),
}

/// Terminal failure of an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to decode audio: {0}")]
    Decode(#[from] DecodeError),

    #[error("feature extraction failed: {0}")]
    Computation(String),
}

impl From<hound::Error> for DecodeError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::FormatError(msg) => DecodeError::Malformed(msg.to_string()),
            hound::Error::Unsupported => DecodeError::UnsupportedFormat,
            other => DecodeError::Malformed(other.to_string()),
        }
    }
}
