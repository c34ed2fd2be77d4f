//! Core post logic for Postgate.
//!
//! This crate contains the post service with ZERO web or database dependencies.
//! The document store is reached through the [`post::PostRepository`] trait and
//! the media area through [`storage::MediaStore`].
//!
//! # Modules
//!
//! - `post` - Post documents, partial updates and the create/update/delete rules
//! - `storage` - Media file storage on local disk or S3-compatible buckets

pub mod post;
pub mod storage;
