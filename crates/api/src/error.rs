//! Error to HTTP response mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use postgate_core::post::PostError;
use postgate_shared::AppError;
use serde_json::json;
use tracing::error;

/// Error returned by handlers.
///
/// Rendered as `{"detail": ..., "error": ...}`. Server-side failures are logged
/// and their detail replaced with a generic message.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<PostError> for ApiError {
    fn from(err: PostError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let detail = if self.0.is_internal() {
            error!(error = %self.0, "Request failed");
            "An error occurred".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(json!({
                "detail": detail,
                "error": self.0.error_code(),
            })),
        )
            .into_response()
    }
}
