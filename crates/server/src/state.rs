use readscore_common::{AppConfig, Result};
use readscore_stt::{transcoder_from_config, AudioTranscoder, GoogleTranscriber, Transcriber};
use std::sync::Arc;

/// Shared, read-only application state
///
/// Nothing here is mutated after startup; every request works on its own
/// values and only borrows the collaborators.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Container audio -> 16kHz mono PCM
    pub transcoder: Arc<dyn AudioTranscoder>,

    /// PCM -> recognized text
    pub transcriber: Arc<dyn Transcriber>,
}

impl AppState {
    /// Create state with the collaborators selected by configuration
    pub fn new(config: AppConfig) -> Result<Self> {
        let transcoder = transcoder_from_config(&config);
        let transcriber = Arc::new(GoogleTranscriber::from_config(&config)?);

        Ok(Self::with_components(config, transcoder, transcriber))
    }

    /// Create state with explicit collaborators
    pub fn with_components(
        config: AppConfig,
        transcoder: Arc<dyn AudioTranscoder>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        Self {
            config,
            transcoder,
            transcriber,
        }
    }
}
