//! Test doubles for the pipeline collaborators

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use readscore_common::AppConfig;
use readscore_stt::{
    AudioTranscoder, PcmAudio, TranscodeError, Transcriber, TranscriptionError, TARGET_SAMPLE_RATE,
};
use std::sync::Arc;

use crate::state::AppState;

/// Transcoder returning a canned outcome
pub enum StubTranscoder {
    Ok,
    Unsupported,
    Backend,
}

impl AudioTranscoder for StubTranscoder {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn transcode(&self, data: Vec<u8>) -> Result<PcmAudio, TranscodeError> {
        match self {
            Self::Ok => Ok(PcmAudio::new(vec![0.0; data.len()], TARGET_SAMPLE_RATE, 1)),
            Self::Unsupported => Err(TranscodeError::UnsupportedFormat(
                "probe: unsupported feature".to_string(),
            )),
            Self::Backend => Err(TranscodeError::Backend("ffmpeg not found".to_string())),
        }
    }
}

/// Transcriber returning a canned outcome
pub enum StubTranscriber {
    Text(&'static str),
    Fail(TranscriptionError),
}

#[async_trait]
impl Transcriber for StubTranscriber {
    async fn transcribe(&self, _audio: &PcmAudio) -> Result<String, TranscriptionError> {
        match self {
            Self::Text(text) => Ok(text.to_string()),
            Self::Fail(err) => Err(err.clone()),
        }
    }
}

pub fn state_with<T>(transcoder: T, transcriber: StubTranscriber) -> AppState
where
    T: AudioTranscoder + 'static,
{
    AppState::with_components(AppConfig::default(), Arc::new(transcoder), Arc::new(transcriber))
}

/// Any valid base64; the stub transcoder does not inspect it
pub fn encoded_audio() -> String {
    STANDARD.encode(b"ID3\x03\x00fake mp3 frames")
}

/// Base64 of a 16-bit mono PCM WAV holding `samples`
pub fn encoded_wav(sample_rate: u32, samples: &[i16]) -> String {
    let data_len = (samples.len() * 2) as u32;

    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVEfmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        wav.extend_from_slice(&sample.to_le_bytes());
    }

    STANDARD.encode(wav)
}
