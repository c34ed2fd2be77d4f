//! Post submission payloads.
//!
//! Creation always arrives as `multipart/form-data`. Partial updates may be
//! sent as JSON, urlencoded form or multipart form, picked by `Content-Type`.

use std::collections::HashMap;

use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use postgate_core::post::{MediaUpload, NewPost, PostPatch};
use postgate_shared::AppError;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Name of the multipart file field carrying the media.
pub const MEDIA_FIELD: &str = "mediaFile";

/// Multipart post submission: text fields plus an optional media file.
#[derive(Debug)]
pub struct CreatePostForm {
    /// Submitted text fields.
    pub post: NewPost,
    /// Uploaded media, if a file was attached.
    pub media: Option<MediaUpload>,
}

impl<S> FromRequest<S> for CreatePostForm
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let mut fields = HashMap::new();
        let mut media = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(IntoResponse::into_response)?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == MEDIA_FIELD {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let content = field.bytes().await.map_err(IntoResponse::into_response)?;
                // Browsers send an empty, unnamed part when no file was picked.
                if !filename.is_empty() {
                    media = Some(MediaUpload::new(filename, content));
                }
            } else {
                let value = field.text().await.map_err(IntoResponse::into_response)?;
                fields.insert(name, value);
            }
        }

        let post = from_fields::<NewPost>(fields)?;
        Ok(Self { post, media })
    }
}

/// Partial update payload.
#[derive(Debug)]
pub struct PostPatchPayload(pub PostPatch);

impl<S> FromRequest<S> for PostPatchPayload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let patch = if content_type.is_empty() {
            PostPatch::default()
        } else if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;

            let mut fields = HashMap::new();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(IntoResponse::into_response)?
            {
                let Some(name) = field.name().map(str::to_owned) else {
                    continue;
                };
                if field.file_name().is_some() {
                    continue;
                }
                let value = field.text().await.map_err(IntoResponse::into_response)?;
                fields.insert(name, value);
            }

            from_fields::<PostPatch>(fields)?
        } else if content_type.starts_with("application/json") {
            let Json(patch) = Json::<PostPatch>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            patch
        } else {
            let Form(patch) = Form::<PostPatch>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            patch
        };

        Ok(Self(patch))
    }
}

/// Deserialize a payload type from collected text fields.
fn from_fields<T: DeserializeOwned>(fields: HashMap<String, String>) -> Result<T, Response> {
    let object = fields
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect();

    serde_json::from_value(Value::Object(object))
        .map_err(|e| ApiError(AppError::Validation(e.to_string())).into_response())
}
