//! Liveness endpoint.

use axum::{Json, Router, extract::State, routing::get};
use postgate_core::post::PostRepository;
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Media backend in use (`local` or `s3`).
    pub media: &'static str,
}

async fn health_check<R: PostRepository + 'static>(
    State(state): State<AppState<R>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        media: state.posts.media().provider_name(),
    })
}

/// Creates the health route.
pub fn routes<R: PostRepository + 'static>() -> Router<AppState<R>> {
    Router::new().route("/health", get(health_check::<R>))
}
