//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for posts
//! - Request extractors for form, multipart and JSON payloads
//! - Error to response mapping

pub mod error;
pub mod extractors;
pub mod routes;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, http::Method};
use postgate_core::post::{PostRepository, PostService};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Room for the text fields of a multipart form on top of the media file.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state shared across handlers.
pub struct AppState<R: PostRepository> {
    /// Post service over the document store and media area.
    pub posts: Arc<PostService<R>>,
}

impl<R: PostRepository> AppState<R> {
    /// Create the application state.
    #[must_use]
    pub fn new(posts: Arc<PostService<R>>) -> Self {
        Self { posts }
    }
}

impl<R: PostRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            posts: Arc::clone(&self.posts),
        }
    }
}

/// Creates the main application router.
pub fn create_router<R: PostRepository + 'static>(state: AppState<R>) -> Router {
    let body_limit = usize::try_from(state.posts.media().config().max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(FORM_OVERHEAD_BYTES);

    Router::new()
        .merge(routes::api_routes::<R>())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers(Any),
        )
        .with_state(state)
}
