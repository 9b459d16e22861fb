//! WAV decoding via hound.
//!
//! Produces a normalized mono f32 buffer at the container's native rate;
//! resampling and the duration cap are applied by [`AudioSample`].
//!
//! [`AudioSample`]: super::AudioSample

use std::io::Cursor;

use tracing::debug;

use crate::error::DecodeError;

/// Decode a WAV byte stream to (mono samples in [-1, 1], source sample rate).
///
/// Multi-channel input is collapsed by averaging across channels. Integer
/// PCM of any supported width is scaled to [-1, 1]; float PCM is passed
/// through unchanged.
pub fn decode_wav(bytes: &[u8]) -> Result<(Vec<f32>, u32), DecodeError> {
    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    debug!(
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        bits = spec.bits_per_sample,
        format = ?spec.sample_format,
        "decoding WAV"
    );

    if spec.channels == 0 {
        return Err(DecodeError::Malformed("zero channels".to_string()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(DecodeError::from)?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .map_err(DecodeError::from)?
        }
    };

    if interleaved.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }

    let mono = downmix(&interleaved, spec.channels as usize);
    Ok((mono, spec.sample_rate))
}

/// Average interleaved channels into a mono buffer.
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_f32(samples: &[f32], sample_rate: u32, channels: u16) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_float_wav_passthrough() {
        let samples = vec![0.25f32, -0.25, 0.5, -0.5];
        let bytes = wav_f32(&samples, 44100, 1);

        let (decoded, rate) = decode_wav(&bytes).unwrap();
        assert_eq!(rate, 44100);
        assert_eq!(decoded.len(), 4);
        for (a, b) in decoded.iter().zip(samples.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = decode_wav(&[0xffu8; 128]);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_rejects_headerless_truncation() {
        // A valid header prefix cut short should not decode to samples.
        let bytes = wav_f32(&[0.1f32; 64], 16000, 1);
        let result = decode_wav(&bytes[..16]);
        assert!(result.is_err());
    }

    #[test]
    fn test_downmix_averages_channels() {
        let interleaved = [1.0f32, 0.0, 0.5, 0.5, -1.0, 1.0];
        let mono = downmix(&interleaved, 2);
        assert_eq!(mono.len(), 3);
        assert!((mono[0] - 0.5).abs() < 1e-6);
        assert!((mono[1] - 0.5).abs() < 1e-6);
        assert!(mono[2].abs() < 1e-6);
    }

    #[test]
    fn test_downmix_mono_is_identity() {
        let samples = [0.1f32, -0.2, 0.3];
        let mono = downmix(&samples, 1);
        assert_eq!(mono, samples.to_vec());
    }
}
