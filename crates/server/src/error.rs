use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use readscore_stt::{DecodeError, TranscodeError, TranscriptionError};

use crate::types::ErrorResponse;

pub const ERROR_MISSING_AUDIO_DATA: &str = "Missing audio data";
pub const ERROR_MISSING_EXPECTED_TEXT: &str = "Missing expected text";
pub const ERROR_INVALID_AUDIO_FORMAT: &str =
    "Invalid audio format; please provide a PCM WAV, AIFF/AIFF-C, or Native FLAC base64 string";
pub const ERROR_UNKNOWN_VALUE: &str = "Unknown value";
pub const ERROR_REQUEST: &str = "Request error";
pub const ERROR_INVALID_BODY: &str = "Invalid request body";
pub const ERROR_INTERNAL: &str = "Internal server error";

/// Failures of a `/recognize` request
///
/// The display string is the user-visible `error` field. Base64 failures
/// and unreadable containers share one message; only `details` tells them
/// apart.
#[derive(Debug, thiserror::Error)]
pub enum RecognizeError {
    #[error("{}", ERROR_MISSING_AUDIO_DATA)]
    MissingAudio,

    #[error("{}", ERROR_MISSING_EXPECTED_TEXT)]
    MissingExpectedText,

    #[error("{}", ERROR_INVALID_AUDIO_FORMAT)]
    InvalidAudio { details: String },

    #[error("{}", ERROR_UNKNOWN_VALUE)]
    UnknownValue,

    #[error("{}", ERROR_REQUEST)]
    Request(String),

    #[error("{}", ERROR_INVALID_BODY)]
    InvalidBody(String),

    #[error("{}", ERROR_INTERNAL)]
    Internal(String),
}

impl RecognizeError {
    /// Short machine-friendly name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingAudio | Self::MissingExpectedText => "validation",
            Self::InvalidAudio { .. } => "decode",
            Self::UnknownValue => "transcription_unknown",
            Self::Request(_) => "transcription_service",
            Self::InvalidBody(_) => "body",
            Self::Internal(_) => "internal",
        }
    }

    /// Extra detail exposed to the client, if any
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::InvalidAudio { details } | Self::InvalidBody(details) => Some(details),
            _ => None,
        }
    }
}

impl From<DecodeError> for RecognizeError {
    fn from(err: DecodeError) -> Self {
        Self::InvalidAudio {
            details: err.to_string(),
        }
    }
}

impl From<TranscodeError> for RecognizeError {
    fn from(err: TranscodeError) -> Self {
        match err {
            TranscodeError::UnsupportedFormat(_) => Self::InvalidAudio {
                details: err.to_string(),
            },
            TranscodeError::Backend(_) | TranscodeError::Io(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<TranscriptionError> for RecognizeError {
    fn from(err: TranscriptionError) -> Self {
        match err {
            TranscriptionError::NoSpeech => Self::UnknownValue,
            TranscriptionError::Request(msg) => Self::Request(msg),
        }
    }
}

impl ResponseError for RecognizeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            details: self.details().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(RecognizeError::MissingAudio.to_string(), "Missing audio data");
        assert_eq!(RecognizeError::UnknownValue.to_string(), "Unknown value");
        assert_eq!(
            RecognizeError::Request("timeout".into()).to_string(),
            "Request error"
        );
    }

    #[test]
    fn test_decode_and_format_share_message() {
        let decode: RecognizeError = DecodeError::Empty.into();
        let format: RecognizeError = TranscodeError::UnsupportedFormat("probe".into()).into();

        assert_eq!(decode.to_string(), format.to_string());
        assert_ne!(decode.details(), format.details());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(RecognizeError::MissingAudio.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(RecognizeError::UnknownValue.status_code(), StatusCode::BAD_REQUEST);
        let backend: RecognizeError = TranscodeError::Backend("ffmpeg missing".into()).into();
        assert_eq!(backend.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_hides_details() {
        let err = RecognizeError::Internal("thread pool gone".into());
        assert_eq!(err.details(), None);
    }

    #[test]
    fn test_transcription_mapping() {
        assert!(matches!(
            RecognizeError::from(TranscriptionError::NoSpeech),
            RecognizeError::UnknownValue
        ));
        assert!(matches!(
            RecognizeError::from(TranscriptionError::Request("503".into())),
            RecognizeError::Request(_)
        ));
    }
}
