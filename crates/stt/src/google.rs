//! Google Cloud Speech-to-Text client
//!
//! Synchronous recognition over REST (`POST /v1/speech:recognize`). The
//! whole utterance is sent in one request as base64 LINEAR16; no retries.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use readscore_common::{AppConfig, ReadScoreError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::audio::{PcmAudio, TARGET_SAMPLE_RATE};
use crate::transcriber::{Transcriber, TranscriptionError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    encoding: &'static str,
    sample_rate_hertz: u32,
    language_code: &'a str,
    max_alternatives: u32,
    profanity_filter: bool,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Debug, Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Google Cloud Speech-to-Text client
#[derive(Debug, Clone)]
pub struct GoogleTranscriber {
    base_url: String,
    api_key: String,
    language: String,
    profanity_filter: bool,
    client: Client,
}

impl GoogleTranscriber {
    /// Create a new client
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        language: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReadScoreError::network(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = base_url.into();
        info!("Google Speech client initialized: {}", base_url);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            language: language.into(),
            profanity_filter: false,
            client,
        })
    }

    /// Create a client from application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        if config.google_api_key.is_empty() {
            warn!("GOOGLE_SPEECH_API_KEY is not set; recognition requests will fail");
        }

        Ok(Self::new(
            &config.google_base_url,
            &config.google_api_key,
            &config.speech_language,
            Duration::from_secs(config.speech_timeout_secs),
        )?
        .with_profanity_filter(config.profanity_filter))
    }

    /// Ask the service to mask profanity
    pub fn with_profanity_filter(mut self, enabled: bool) -> Self {
        self.profanity_filter = enabled;
        self
    }

    fn recognize_url(&self) -> String {
        format!("{}/v1/speech:recognize", self.base_url)
    }

    fn build_request(&self, audio: &PcmAudio) -> RecognizeRequest<'_> {
        RecognizeRequest {
            config: RecognitionConfig {
                encoding: "LINEAR16",
                sample_rate_hertz: audio.sample_rate,
                language_code: &self.language,
                max_alternatives: 1,
                profanity_filter: self.profanity_filter,
            },
            audio: RecognitionAudio {
                content: STANDARD.encode(audio.to_pcm16_le()),
            },
        }
    }
}

/// Join the best alternative of every result; blank means no speech
fn parse_transcript(body: &str) -> std::result::Result<String, TranscriptionError> {
    let response: RecognizeResponse = serde_json::from_str(body).map_err(|e| {
        TranscriptionError::Request(format!("Failed to parse response: {}", e))
    })?;

    let text = response
        .results
        .iter()
        .filter_map(|r| r.alternatives.first())
        .map(|alt| alt.transcript.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        return Err(TranscriptionError::NoSpeech);
    }

    Ok(text)
}

/// Best-effort extraction of Google's error message
fn parse_error(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => match (err.error.status, err.error.message) {
            (Some(status), Some(message)) => format!("{}: {}", status, message),
            (None, Some(message)) => message,
            (Some(status), None) => status,
            (None, None) => "unknown error".to_string(),
        },
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl Transcriber for GoogleTranscriber {
    async fn transcribe(&self, audio: &PcmAudio) -> std::result::Result<String, TranscriptionError> {
        if audio.is_empty() {
            return Err(TranscriptionError::NoSpeech);
        }

        if self.api_key.is_empty() {
            return Err(TranscriptionError::Request("API key is not configured".to_string()));
        }

        if audio.sample_rate != TARGET_SAMPLE_RATE || audio.channels != 1 {
            debug!(
                sample_rate = audio.sample_rate,
                channels = audio.channels,
                "Audio is not 16kHz mono; sending as-is"
            );
        }

        let request = self.build_request(audio);

        debug!(
            "Sending {:.1}s of audio to Google Speech - Language: {}",
            audio.duration(),
            self.language
        );

        let response = self
            .client
            .post(self.recognize_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| TranscriptionError::Request(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TranscriptionError::Request(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = parse_error(&body);
            warn!("Google Speech API error ({}): {}", status, message);
            return Err(TranscriptionError::Request(format!(
                "status {}: {}",
                status, message
            )));
        }

        let text = parse_transcript(&body)?;
        debug!("Received transcript - Length: {}", text.len());

        Ok(text)
    }
}
