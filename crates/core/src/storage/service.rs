//! Media store implementation using Apache OpenDAL.

use std::path::Path;

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Bytes left as-is in a filename component. Everything else, `.` and `%`
/// included, is percent-encoded so components never contain the separator.
const NAME_COMPONENT_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// Flat media area holding one file per post.
pub struct MediaStore {
    operator: Operator,
    config: StorageConfig,
}

impl MediaStore {
    /// Create a new media store from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::LocalFs { root } => {
                // The fs service creates the root directory when missing.
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
        };

        Ok(operator)
    }

    /// Validate an upload against config constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is larger than the configured maximum.
    pub fn validate_upload(&self, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::file_too_large(
                size,
                self.config.max_file_size,
            ));
        }

        Ok(())
    }

    /// Derive the stored filename for a post's media.
    ///
    /// Format: `{username}.{post_id}{extension}`, where the extension is taken
    /// from the uploaded file name (with its dot, empty when there is none).
    /// Each component is percent-encoded, so distinct posts never share a
    /// name and every name stays a single path segment. The same post always
    /// maps to the same name, so re-submitting a post replaces its file.
    #[must_use]
    pub fn media_filename(username: &str, post_id: &str, original_filename: &str) -> String {
        let extension = Path::new(original_filename)
            .extension()
            .map(|ext| format!(".{}", encode_component(&ext.to_string_lossy())))
            .unwrap_or_default();

        format!(
            "{}.{}{extension}",
            encode_component(username),
            encode_component(post_id)
        )
    }

    /// Media reference (path or URL) for a stored filename.
    #[must_use]
    pub fn reference_for(&self, filename: &str) -> String {
        format!("{}/{filename}", self.config.provider.reference_base())
    }

    /// Storage key addressed by a media reference.
    ///
    /// The media area is flat, so the key is the last path segment.
    pub fn key_from_reference(reference: &str) -> Result<&str, StorageError> {
        match reference.rsplit(['/', '\\']).next() {
            Some(key) if !key.is_empty() && key != "." && key != ".." => Ok(key),
            _ => Err(StorageError::InvalidKey(reference.to_string())),
        }
    }

    /// Write a media file and return its reference.
    ///
    /// The whole body is written before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is too large or the write fails.
    pub async fn store(&self, filename: &str, content: Bytes) -> Result<String, StorageError> {
        self.validate_upload(content.len() as u64)?;

        self.operator
            .write(filename, content)
            .await
            .map_err(StorageError::from)?;

        Ok(self.reference_for(filename))
    }

    /// Delete the file behind a media reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is invalid or deletion fails.
    pub async fn delete(&self, reference: &str) -> Result<(), StorageError> {
        let key = Self::key_from_reference(reference)?;
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Check if the file behind a media reference exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is invalid or the store cannot be
    /// queried. A missing file is `Ok(false)`.
    pub async fn exists(&self, reference: &str) -> Result<bool, StorageError> {
        let key = Self::key_from_reference(reference)?;

        match self.operator.stat(key).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

fn encode_component(component: &str) -> String {
    utf8_percent_encode(component, NAME_COMPONENT_SET).to_string()
}
