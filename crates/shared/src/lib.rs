//! Shared errors and configuration for Postgate.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;

pub use config::{AppConfig, DatabaseConfig, MediaConfig, S3Config, ServerConfig};
pub use error::AppError;
