use serde::{Deserialize, Serialize};

/// Recognition request body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecognizeRequest {
    /// Base64 encoded audio
    #[serde(default)]
    pub record: Option<String>,

    /// Sentence the speaker was asked to read
    #[serde(default)]
    pub sentence: Option<String>,
}

/// Successful recognition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizeResponse {
    /// Text returned by the speech service
    pub recognized_text: String,

    /// Similarity to the expected sentence, 0-100
    pub accuracy: f64,
}

/// Error body shared by all failure responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub transcoder: String,
}
