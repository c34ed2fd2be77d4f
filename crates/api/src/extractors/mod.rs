//! Request extractors.

mod post_form;

pub use post_form::{CreatePostForm, MEDIA_FIELD, PostPatchPayload};
