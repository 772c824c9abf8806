//! ReadScore HTTP server
//!
//! Actix-web application exposing `POST /recognize` and `GET /health`

pub mod error;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod types;

#[cfg(test)]
mod testing;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use readscore_common::{AppConfig, Result};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub use error::RecognizeError;
pub use state::AppState;

/// Register routes and extractor settings
pub fn configure(cfg: &mut web::ServiceConfig, max_payload_bytes: usize) {
    cfg.app_data(routes::recognize::json_config(max_payload_bytes))
        .service(routes::recognize::recognize)
        .service(routes::system::health);
}

/// Build state from configuration and serve until shutdown
pub async fn start_server(config: AppConfig) -> Result<()> {
    let state = Arc::new(AppState::new(config.clone())?);
    serve(config, state).await
}

/// Serve with an already-built state
pub async fn serve(config: AppConfig, state: Arc<AppState>) -> Result<()> {
    let bind_addr = config.server_bind_address();
    let max_payload_bytes = config.max_payload_bytes;
    let data = web::Data::new(state);

    info!(
        "Starting HTTP server on {} (transcoder: {}, max payload: {} bytes)",
        bind_addr,
        data.transcoder.name(),
        max_payload_bytes
    );

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .app_data(data.clone())
            .configure(|cfg| configure(cfg, max_payload_bytes))
    });

    if let Some(workers) = config.server_workers {
        server = server.workers(workers);
    }

    server.bind(&bind_addr)?.run().await?;

    info!("HTTP server stopped");

    Ok(())
}
