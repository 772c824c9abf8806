use actix_web::error::InternalError;
use actix_web::{post, web, HttpResponse, ResponseError};
use tracing::{info, warn};

use crate::error::RecognizeError;
use crate::pipeline;
use crate::state::AppState;
use crate::types::RecognizeRequest;

/// JSON extractor settings for `/recognize`
///
/// Unparsable or oversize bodies get the same JSON error shape as every
/// other failure.
pub fn json_config(max_payload_bytes: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(max_payload_bytes)
        .error_handler(|err, _req| {
            let error = RecognizeError::InvalidBody(err.to_string());
            warn!(kind = error.kind(), details = ?error.details(), "Rejected request body");
            let response = error.error_response();
            InternalError::from_response(err, response).into()
        })
}

/// Transcribe a recording and score it against the expected sentence
#[post("/recognize")]
pub async fn recognize(
    req: web::Json<RecognizeRequest>,
    state: web::Data<std::sync::Arc<AppState>>,
) -> Result<HttpResponse, RecognizeError> {
    let request = req.into_inner();

    info!(
        audio_len = request.record.as_ref().map(String::len).unwrap_or(0),
        sentence_len = request.sentence.as_ref().map(String::len).unwrap_or(0),
        "Recognition requested"
    );

    match pipeline::recognize(&state, request).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => {
            match &e {
                RecognizeError::Internal(msg) => {
                    tracing::error!(kind = e.kind(), "Recognition failed: {}", msg)
                }
                RecognizeError::Request(msg) => {
                    warn!(kind = e.kind(), "Recognition failed: {}", msg)
                }
                _ => warn!(kind = e.kind(), details = ?e.details(), "Recognition failed: {}", e),
            }
            Err(e)
        }
    }
}
