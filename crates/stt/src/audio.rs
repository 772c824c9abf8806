//! Audio payload decoding and the PCM buffer handed to recognition

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Sample rate expected by the speech recognizer
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Base64 payload could not be decoded
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("audio data is empty")]
    Empty,
    #[error("invalid base64 audio data: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Decode a base64 audio payload into raw bytes
///
/// Accepts the standard alphabet with padding. Surrounding whitespace and a
/// `data:<mime>;base64,` prefix (as produced by browser `FileReader`) are
/// ignored.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    let mut payload = encoded.trim();

    if payload.starts_with("data:") {
        if let Some(idx) = payload.find(";base64,") {
            payload = &payload[idx + ";base64,".len()..];
        }
    }

    if payload.is_empty() {
        return Err(DecodeError::Empty);
    }

    let bytes = STANDARD.decode(payload)?;
    debug!(encoded_len = payload.len(), decoded_len = bytes.len(), "Decoded base64 audio");

    Ok(bytes)
}

/// PCM audio buffer (f32 samples normalized to [-1.0, 1.0], interleaved)
#[derive(Debug, Clone, PartialEq)]
pub struct PcmAudio {
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of interleaved channels
    pub channels: u16,
}

impl PcmAudio {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.channels as f32 / self.sample_rate as f32
    }

    /// Downmix to mono by averaging channels
    pub fn to_mono(mut self) -> Self {
        if self.channels <= 1 {
            return self;
        }

        debug!(channels = self.channels, "Downmixing to mono");

        let channels = self.channels as usize;
        self.samples = self
            .samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
        self.channels = 1;
        self
    }

    /// Resample a mono buffer by linear interpolation
    pub fn resample(mut self, target_rate: u32) -> Self {
        if self.sample_rate == target_rate || self.samples.is_empty() {
            self.sample_rate = target_rate;
            return self;
        }

        debug!(from = self.sample_rate, to = target_rate, "Resampling");

        let ratio = self.sample_rate as f64 / target_rate as f64;
        let new_length = (self.samples.len() as f64 / ratio) as usize;
        let last = self.samples.len() - 1;

        let resampled = (0..new_length)
            .map(|i| {
                let src_index = i as f64 * ratio;
                let floor = (src_index.floor() as usize).min(last);
                let ceil = (floor + 1).min(last);
                let fraction = (src_index - floor as f64) as f32;

                self.samples[floor] * (1.0 - fraction) + self.samples[ceil] * fraction
            })
            .collect();

        self.samples = resampled;
        self.sample_rate = target_rate;
        self
    }

    /// Convert to the recognizer's input shape: mono, 16kHz
    pub fn into_recognizer_format(self) -> Self {
        self.to_mono().resample(TARGET_SAMPLE_RATE)
    }

    /// Encode as 16-bit little-endian PCM (LINEAR16)
    pub fn to_pcm16_le(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.samples.len() * 2);
        for sample in &self.samples {
            let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            out.extend_from_slice(&value.to_le_bytes());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64() {
        assert_eq!(decode_base64("aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn test_decode_base64_trims_and_strips_data_url() {
        assert_eq!(decode_base64("  aGVsbG8=\n").unwrap(), b"hello");
        assert_eq!(
            decode_base64("data:audio/mpeg;base64,aGVsbG8=").unwrap(),
            b"hello"
        );
    }

    #[test]
    fn test_decode_base64_rejects_malformed() {
        assert!(matches!(decode_base64("not base64!!"), Err(DecodeError::Base64(_))));
        // Missing padding
        assert!(matches!(decode_base64("aGVsbG8"), Err(DecodeError::Base64(_))));
    }

    #[test]
    fn test_decode_base64_rejects_empty() {
        assert!(matches!(decode_base64("   "), Err(DecodeError::Empty)));
        assert!(matches!(decode_base64("data:audio/wav;base64,"), Err(DecodeError::Empty)));
    }

    #[test]
    fn test_duration() {
        let buffer = PcmAudio::new(vec![0.0; 16000], 16000, 1);
        assert_eq!(buffer.duration(), 1.0);

        let buffer = PcmAudio::new(vec![0.0; 16000], 16000, 2);
        assert_eq!(buffer.duration(), 0.5);
    }

    #[test]
    fn test_to_mono() {
        let samples = vec![0.5, -0.5, 0.5, 0.25]; // 2 frames, 2 channels
        let mono = PcmAudio::new(samples, 16000, 2).to_mono();
        assert_eq!(mono.channels, 1);
        assert_eq!(mono.samples, vec![0.0, 0.375]);
    }

    #[test]
    fn test_resample() {
        let buffer = PcmAudio::new(vec![0.0; 44100], 44100, 1);
        let resampled = buffer.resample(16000);
        assert_eq!(resampled.sample_rate, 16000);
        assert!((resampled.samples.len() as i32 - 16000).abs() < 100);
    }

    #[test]
    fn test_upsample_interpolates() {
        let buffer = PcmAudio::new(vec![0.0, 1.0], 8000, 1);
        let resampled = buffer.resample(16000);
        assert_eq!(resampled.samples, vec![0.0, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn test_resample_empty() {
        let resampled = PcmAudio::new(Vec::new(), 44100, 1).resample(16000);
        assert!(resampled.is_empty());
        assert_eq!(resampled.sample_rate, 16000);
    }

    #[test]
    fn test_to_pcm16_le() {
        let pcm = PcmAudio::new(vec![0.0, 1.0, -1.0, 2.0], 16000, 1).to_pcm16_le();
        assert_eq!(pcm.len(), 8);
        assert_eq!(i16::from_le_bytes([pcm[0], pcm[1]]), 0);
        assert_eq!(i16::from_le_bytes([pcm[2], pcm[3]]), i16::MAX);
        assert_eq!(i16::from_le_bytes([pcm[4], pcm[5]]), -i16::MAX);
        // Clamped
        assert_eq!(i16::from_le_bytes([pcm[6], pcm[7]]), i16::MAX);
    }
}
