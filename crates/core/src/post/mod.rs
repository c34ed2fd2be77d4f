//! Post documents and the rules for creating, listing, patching and deleting them.
//!
//! A post is written in two steps: its media file (if any) goes to the
//! [`MediaStore`](crate::storage::MediaStore) first, then the document goes to
//! the [`PostRepository`]. Deleting runs the same steps in reverse order.

mod error;
mod service;
mod types;

pub use error::{PostError, PostOperation};
pub use service::{PostRepository, PostService};
pub use types::{Confirmation, MediaUpload, NewPost, Post, PostPatch};
