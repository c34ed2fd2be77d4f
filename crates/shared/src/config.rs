//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Document store configuration.
    pub database: DatabaseConfig,
    /// Media area configuration.
    #[serde(default)]
    pub media: MediaConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Run pending migrations when the server starts.
    #[serde(default = "default_auto_migrate")]
    pub auto_migrate: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_auto_migrate() -> bool {
    true
}

/// Media area configuration.
///
/// Files go to the local `root` directory unless an `s3` table is present.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Local media directory.
    #[serde(default = "default_media_root")]
    pub root: PathBuf,
    /// Maximum accepted media file size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// S3-compatible bucket settings.
    #[serde(default)]
    pub s3: Option<S3Config>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: default_media_root(),
            max_file_size: default_max_file_size(),
            s3: None,
        }
    }
}

fn default_media_root() -> PathBuf {
    PathBuf::from("UserMedia")
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024 // 10MB
}

/// S3-compatible bucket settings.
#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    /// S3 endpoint URL.
    pub endpoint: String,
    /// Bucket name.
    pub bucket: String,
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Region.
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    "auto".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("POSTGATE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
