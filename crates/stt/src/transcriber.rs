use async_trait::async_trait;

use crate::audio::PcmAudio;

/// Speech recognition failure
///
/// `NoSpeech` is not an error of the service: the audio was processed but
/// nothing intelligible was found.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TranscriptionError {
    #[error("no speech could be recognized")]
    NoSpeech,

    /// The service could not be reached or rejected the request
    #[error("speech service request failed: {0}")]
    Request(String),
}

/// Common trait for speech recognition backends
///
/// Input is mono 16kHz PCM. A successful result is never empty; an empty
/// recognition is reported as `TranscriptionError::NoSpeech`.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &PcmAudio) -> Result<String, TranscriptionError>;
}
