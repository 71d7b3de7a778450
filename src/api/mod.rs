pub mod handlers;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::pipeline::AssessmentPipeline;

pub struct AppState {
    pub pipeline: AssessmentPipeline,
    pub max_batch_size: usize,
}

pub fn router(pipeline: AssessmentPipeline, max_batch_size: usize) -> Router {
    let state = Arc::new(AppState {
        pipeline,
        max_batch_size,
    });

    Router::new()
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/rules", get(handlers::rules))
        .route("/api/v1/assess", post(handlers::assess))
        .route("/api/v1/assess/batch", post(handlers::assess_batch))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve the API until `shutdown` is cancelled.
pub async fn serve(
    pipeline: AssessmentPipeline,
    host: &str,
    port: u16,
    max_batch_size: usize,
    shutdown: CancellationToken,
) -> eyre::Result<()> {
    let app = router(pipeline, max_batch_size);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre::eyre!("Failed to bind API listener on {}: {}", addr, e))?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    tracing::info!("API server stopped");
    Ok(())
}
