//! Post routes.
//!
//! `/posts/` and `/posts` are served identically since existing clients use
//! the trailing-slash form.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use postgate_core::post::{Confirmation, Post, PostRepository};

use crate::{
    AppState,
    error::ApiError,
    extractors::{CreatePostForm, PostPatchPayload},
};

/// Creates the post routes.
pub fn routes<R: PostRepository + 'static>() -> Router<AppState<R>> {
    Router::new()
        .route("/posts/", get(list_posts::<R>).post(create_post::<R>))
        .route("/posts", get(list_posts::<R>).post(create_post::<R>))
        .route(
            "/posts/{post_id}",
            put(update_post::<R>).delete(delete_post::<R>),
        )
}

/// POST `/posts/`
/// Create a post, or overwrite the post with the same `postID`.
async fn create_post<R: PostRepository + 'static>(
    State(state): State<AppState<R>>,
    form: CreatePostForm,
) -> Result<Json<Confirmation>, ApiError> {
    let confirmation = state.posts.create(form.post, form.media).await?;
    Ok(Json(confirmation))
}

/// GET `/posts/`
/// List every post document.
async fn list_posts<R: PostRepository + 'static>(
    State(state): State<AppState<R>>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = state.posts.list().await?;
    Ok(Json(posts))
}

/// PUT `/posts/{post_id}`
/// Patch the editable fields of a post.
async fn update_post<R: PostRepository + 'static>(
    State(state): State<AppState<R>>,
    Path(post_id): Path<String>,
    PostPatchPayload(patch): PostPatchPayload,
) -> Result<Json<Confirmation>, ApiError> {
    let confirmation = state.posts.update(&post_id, patch).await?;
    Ok(Json(confirmation))
}

/// DELETE `/posts/{post_id}`
/// Delete a post and its media file.
async fn delete_post<R: PostRepository + 'static>(
    State(state): State<AppState<R>>,
    Path(post_id): Path<String>,
) -> Result<Json<Confirmation>, ApiError> {
    let confirmation = state.posts.delete(&post_id).await?;
    Ok(Json(confirmation))
}
