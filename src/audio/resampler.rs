//! Whole-buffer resampling to the analysis sample rate.

use rubato::{FftFixedIn, Resampler};
use tracing::debug;

use crate::error::DecodeError;

/// Fixed input chunk size fed to the FFT resampler.
const CHUNK_SIZE: usize = 1024;

/// Resample a mono buffer from `source_rate` to `target_rate`.
///
/// The output length is exactly `round(len * target_rate / source_rate)`;
/// the resampler's startup delay is compensated by flushing zero chunks and
/// dropping the leading delay samples.
pub fn resample(input: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>, DecodeError> {
    if source_rate == target_rate {
        return Ok(input.to_vec());
    }

    let ratio = target_rate as f64 / source_rate as f64;
    debug!(
        source_rate,
        target_rate,
        ratio = format!("{:.4}", ratio),
        "resampling"
    );

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        CHUNK_SIZE,
        2, // sub_chunks for quality
        1, // mono
    )
    .map_err(|e| DecodeError::Resample(e.to_string()))?;

    let delay = resampler.output_delay();
    let expected = (input.len() as f64 * ratio).round() as usize;
    let mut output = Vec::with_capacity(expected + CHUNK_SIZE);

    let mut chunk = vec![0.0f32; CHUNK_SIZE];
    let mut pos = 0;
    while pos < input.len() {
        let end = (pos + CHUNK_SIZE).min(input.len());
        chunk[..end - pos].copy_from_slice(&input[pos..end]);
        chunk[end - pos..].fill(0.0);

        let frames = resampler
            .process(&[&chunk], None)
            .map_err(|e| DecodeError::Resample(e.to_string()))?;
        output.extend_from_slice(&frames[0]);
        pos = end;
    }

    // Flush zeros until the delayed tail of the real signal has emerged.
    chunk.fill(0.0);
    while output.len() < expected + delay {
        let frames = resampler
            .process(&[&chunk], None)
            .map_err(|e| DecodeError::Resample(e.to_string()))?;
        output.extend_from_slice(&frames[0]);
    }

    output.drain(..delay.min(output.len()));
    output.truncate(expected);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: u32, secs: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * secs) as usize;
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_resample_48k_to_16k_length() {
        let input = sine(440.0, 48000, 1.0);
        let output = resample(&input, 48000, 16000).unwrap();
        assert_eq!(output.len(), 16000);
    }

    #[test]
    fn test_resample_44100_to_16k_length() {
        let input = sine(440.0, 44100, 1.0);
        let output = resample(&input, 44100, 16000).unwrap();
        let expected = (44100.0f64 * 16000.0 / 44100.0).round() as usize;
        assert_eq!(output.len(), expected);
    }

    #[test]
    fn test_resample_same_rate_is_identity() {
        let input = sine(200.0, 16000, 0.25);
        let output = resample(&input, 16000, 16000).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_resample_preserves_energy() {
        // A mid-band tone should come through with comparable RMS.
        let input = sine(440.0, 48000, 1.0);
        let output = resample(&input, 48000, 16000).unwrap();

        let rms = |xs: &[f32]| (xs.iter().map(|x| x * x).sum::<f32>() / xs.len() as f32).sqrt();
        let in_rms = rms(&input);
        let out_rms = rms(&output);
        assert!(
            (in_rms - out_rms).abs() / in_rms < 0.1,
            "RMS changed too much: {} vs {}",
            in_rms,
            out_rms
        );
    }

    #[test]
    fn test_resample_short_input() {
        // Shorter than one chunk still produces proportional output.
        let input = sine(200.0, 48000, 0.01); // 480 samples
        let output = resample(&input, 48000, 16000).unwrap();
        assert_eq!(output.len(), 160);
    }
}
