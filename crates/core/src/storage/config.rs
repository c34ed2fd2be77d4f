//! Storage configuration types.

use std::path::PathBuf;

use postgate_shared::MediaConfig;

/// Storage provider configuration.
#[derive(Debug, Clone)]
pub enum StorageProvider {
    /// S3-compatible storage: Cloudflare R2, MinIO, AWS S3
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Local filesystem directory
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
}

impl StorageProvider {
    /// Create S3-compatible provider.
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create local filesystem provider.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
        }
    }

    /// Prefix that media references for this provider start with.
    ///
    /// Local references are `{root}/{filename}`, S3 references are
    /// `{endpoint}/{bucket}/{filename}`.
    #[must_use]
    pub fn reference_base(&self) -> String {
        match self {
            Self::S3 {
                endpoint, bucket, ..
            } => format!("{}/{bucket}", endpoint.trim_end_matches('/')),
            Self::LocalFs { root } => root.to_string_lossy().trim_end_matches('/').to_string(),
        }
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
}

impl StorageConfig {
    /// Default max file size: 10MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Build the storage config from the `media` section of the app config.
    #[must_use]
    pub fn from_media_config(media: &MediaConfig) -> Self {
        let provider = match &media.s3 {
            Some(s3) => StorageProvider::s3(
                &s3.endpoint,
                &s3.bucket,
                &s3.access_key_id,
                &s3.secret_access_key,
                &s3.region,
            ),
            None => StorageProvider::local_fs(&media.root),
        };

        Self::new(provider).with_max_file_size(media.max_file_size)
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }
}
