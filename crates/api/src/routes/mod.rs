//! API route definitions.

use axum::Router;
use postgate_core::post::PostRepository;

use crate::AppState;

pub mod health;
pub mod posts;

/// Creates the API router with all routes.
pub fn api_routes<R: PostRepository + 'static>() -> Router<AppState<R>> {
    Router::new()
        .merge(health::routes::<R>())
        .merge(posts::routes::<R>())
}
