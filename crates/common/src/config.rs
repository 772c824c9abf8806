use crate::error::ReadScoreError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Transcoders understood by `TRANSCODER`
pub const TRANSCODERS: &[&str] = &["symphonia", "ffmpeg"];

/// ReadScore application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Number of HTTP workers (None = one per CPU)
    pub server_workers: Option<usize>,

    /// Maximum accepted JSON body size in bytes
    pub max_payload_bytes: usize,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,

    /// Transcoder backend ("symphonia" or "ffmpeg")
    pub transcoder: String,

    /// FFmpeg executable used by the ffmpeg transcoder
    pub ffmpeg_path: String,

    /// Google Cloud Speech API key
    pub google_api_key: String,

    /// Google Cloud Speech API base URL
    pub google_base_url: String,

    /// Recognition language (BCP-47)
    pub speech_language: String,

    /// Speech request timeout in seconds
    pub speech_timeout_secs: u64,

    /// Ask the speech service to mask profanity
    pub profanity_filter: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 5000,
            server_workers: None,
            max_payload_bytes: 25 * 1024 * 1024,
            log_dir: PathBuf::from("./log"),
            log_level: "info".to_string(),
            transcoder: "symphonia".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            google_api_key: String::new(),
            google_base_url: "https://speech.googleapis.com".to_string(),
            speech_language: "en-US".to_string(),
            speech_timeout_secs: 30,
            profanity_filter: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, ReadScoreError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();

        let config = Self {
            server_host: std::env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: Self::get_env_parsed("SERVER_PORT")?.unwrap_or(defaults.server_port),
            server_workers: Self::get_env_parsed("SERVER_WORKERS")?,
            max_payload_bytes: Self::get_env_parsed("MAX_PAYLOAD_BYTES")?
                .unwrap_or(defaults.max_payload_bytes),
            log_dir: std::env::var("LOG_DIR")
                .ok()
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            transcoder: std::env::var("TRANSCODER")
                .map(|s| s.to_lowercase())
                .unwrap_or(defaults.transcoder),
            ffmpeg_path: std::env::var("FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            google_api_key: std::env::var("GOOGLE_SPEECH_API_KEY")
                .unwrap_or(defaults.google_api_key),
            google_base_url: std::env::var("GOOGLE_SPEECH_BASE_URL")
                .unwrap_or(defaults.google_base_url),
            speech_language: std::env::var("SPEECH_LANGUAGE")
                .unwrap_or(defaults.speech_language),
            speech_timeout_secs: Self::get_env_parsed("SPEECH_TIMEOUT_SECS")?
                .unwrap_or(defaults.speech_timeout_secs),
            profanity_filter: Self::get_env_parsed("PROFANITY_FILTER")?
                .unwrap_or(defaults.profanity_filter),
        };

        config.validate()?;

        Ok(config)
    }

    /// Parse an optional environment variable, rejecting malformed values
    fn get_env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ReadScoreError> {
        match std::env::var(key) {
            Ok(raw) => raw.trim().parse().map(Some).map_err(|_| {
                ReadScoreError::config(format!("Invalid value for {}: {:?}", key, raw))
            }),
            Err(_) => Ok(None),
        }
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ReadScoreError> {
        if self.server_port == 0 {
            return Err(ReadScoreError::config("Server port cannot be 0"));
        }

        if self.server_workers == Some(0) {
            return Err(ReadScoreError::config("Server workers cannot be 0"));
        }

        if self.max_payload_bytes == 0 {
            return Err(ReadScoreError::config("Maximum payload size cannot be 0"));
        }

        if !TRANSCODERS.contains(&self.transcoder.as_str()) {
            return Err(ReadScoreError::config(format!(
                "Unknown transcoder '{}', expected one of {:?}",
                self.transcoder, TRANSCODERS
            )));
        }

        if !self.google_base_url.starts_with("http://")
            && !self.google_base_url.starts_with("https://") {
            return Err(ReadScoreError::config(
                "Google Speech base URL must start with http:// or https://"
            ));
        }

        if self.speech_language.trim().is_empty() {
            return Err(ReadScoreError::config("Speech language cannot be empty"));
        }

        if self.speech_timeout_secs == 0 {
            return Err(ReadScoreError::config("Speech timeout cannot be 0"));
        }

        Ok(())
    }
}
