//! Post error types.

use std::fmt;

use postgate_shared::AppError;
use thiserror::Error;

use crate::storage::StorageError;

/// Operation that looked up a post by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOperation {
    /// Partial update.
    Update,
    /// Deletion.
    Delete,
}

impl fmt::Display for PostOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => f.write_str("update"),
            Self::Delete => f.write_str("delete"),
        }
    }
}

/// Post operation errors.
#[derive(Debug, Error)]
pub enum PostError {
    /// The store holds no posts at all.
    #[error("No posts found.")]
    NoPosts,

    /// Post identifier absent from the store.
    #[error("Cannot {operation} post {post_id}: not found.")]
    NotFound {
        /// Operation that was attempted.
        operation: PostOperation,
        /// Identifier that was looked up.
        post_id: String,
    },

    /// Required submission fields were empty.
    #[error("required fields are empty: {}", .0.join(", "))]
    EmptyFields(Vec<&'static str>),

    /// Media storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Document store failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl PostError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(operation: PostOperation, post_id: impl Into<String>) -> Self {
        Self::NotFound {
            operation,
            post_id: post_id.into(),
        }
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::NoPosts | PostError::NotFound { .. } => Self::NotFound(err.to_string()),
            PostError::EmptyFields(_) => Self::Validation(err.to_string()),
            PostError::Storage(StorageError::FileTooLarge { size, max }) => Self::PayloadTooLarge(
                format!("media file is {size} bytes, the limit is {max} bytes"),
            ),
            PostError::Storage(e) => Self::Storage(e.to_string()),
            PostError::Repository(msg) => Self::Database(msg),
        }
    }
}
