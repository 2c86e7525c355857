//! HTTP server: routing, body limits, CORS, and graceful shutdown.

pub mod handlers;
pub mod state;

pub use handlers::{ApiError, HealthResponse};
pub use state::{AppState, EngineSet, ModelHandle};

use crate::config::Config;
use crate::defaults;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tracing::info;

/// Build the application router for the given state.
pub fn router(state: AppState) -> Router {
    let max_body = state.config.server.max_upload_mb * 1024 * 1024;
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/transcribe", post(handlers::transcribe))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(
        backend = defaults::gpu_backend(),
        compute_type = defaults::compute_type(),
        model = %config.stt.model,
        diarization = config.diarization_available(),
        "starting"
    );
    let state = AppState::from_config(config);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {}", e);
        return;
    }
    info!("shutdown signal received");
}
