//! Recognition pipeline: validate -> decode -> transcode -> transcribe -> score
//!
//! Every step is terminal on failure; nothing is retried.

use actix_web::web;
use readscore_scoring::score;
use readscore_stt::decode_base64;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::RecognizeError;
use crate::state::AppState;
use crate::types::{RecognizeRequest, RecognizeResponse};

/// Validated request fields
#[derive(Debug)]
struct Recognition {
    audio_base64: String,
    expected_text: String,
}

impl TryFrom<RecognizeRequest> for Recognition {
    type Error = RecognizeError;

    fn try_from(req: RecognizeRequest) -> Result<Self, Self::Error> {
        let audio_base64 = req
            .record
            .filter(|s| !s.is_empty())
            .ok_or(RecognizeError::MissingAudio)?;
        let expected_text = req
            .sentence
            .filter(|s| !s.is_empty())
            .ok_or(RecognizeError::MissingExpectedText)?;

        Ok(Self {
            audio_base64,
            expected_text,
        })
    }
}

/// Run one request through the pipeline
pub async fn recognize(
    state: &AppState,
    request: RecognizeRequest,
) -> Result<RecognizeResponse, RecognizeError> {
    let started = Instant::now();
    let Recognition {
        audio_base64,
        expected_text,
    } = Recognition::try_from(request)?;

    let audio_bytes = decode_base64(&audio_base64)?;

    // Transcoding blocks (CPU or subprocess)
    let transcoder = Arc::clone(&state.transcoder);
    let pcm = web::block(move || transcoder.transcode(audio_bytes))
        .await
        .map_err(|e| RecognizeError::Internal(format!("blocking pool: {}", e)))??;

    debug!(
        samples = pcm.samples.len(),
        duration_secs = pcm.duration(),
        "Audio transcoded to {}Hz mono",
        pcm.sample_rate
    );

    let recognized_text = state.transcriber.transcribe(&pcm).await?;

    let accuracy = score(&expected_text, &recognized_text)
        .map_err(|e| RecognizeError::Internal(e.to_string()))?;

    info!(
        accuracy,
        recognized_chars = recognized_text.chars().count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Recognition complete"
    );

    Ok(RecognizeResponse {
        recognized_text,
        accuracy,
    })
}
