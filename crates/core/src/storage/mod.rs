//! Media storage for post media files using Apache OpenDAL.
//!
//! Media files live in a flat area (one directory or one bucket). Every file is
//! addressed by a media reference, the path or URL stored on the post document.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Apache OpenDAL                              │
//! │                   (Unified Storage API)                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ op.write("key", data)      │ op.stat("key")                     │
//! │ op.delete("key")           │                                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::MediaStore;
