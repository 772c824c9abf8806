//! ReadScore STT (Speech-to-Text) pipeline pieces
//!
//! Base64 decoding, transcoding to 16kHz mono PCM, and the speech
//! recognition client

pub mod audio;
pub mod google;
pub mod transcode;
pub mod transcriber;

// Re-export main types
pub use audio::{decode_base64, DecodeError, PcmAudio, TARGET_SAMPLE_RATE};
pub use google::GoogleTranscriber;
pub use transcode::{
    transcoder_from_config, AudioTranscoder, FfmpegTranscoder, SymphoniaTranscoder, TranscodeError,
    MAX_DURATION_SECS, SAMPLE_RATE_RANGE,
};
pub use transcriber::{Transcriber, TranscriptionError};
