use crate::keys::{key_from_public_url, public_url};
use crate::traits::{DeleteOutcome, PhotoStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem photo store
///
/// Files live directly under `base_path`; URLs follow the same
/// `{base_url}/{bucket}/{key}` shape as the S3 backend.
#[derive(Clone)]
pub struct LocalPhotoStore {
    base_path: PathBuf,
    base_url: String,
    bucket: String,
}

impl LocalPhotoStore {
    /// Create a new LocalPhotoStore instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for photo files (e.g., "/var/lib/intake/photos")
    /// * `base_url` - Base URL the files are served under (e.g., "http://localhost:4000/photos")
    /// * `bucket` - Bucket segment of public URLs
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        bucket: String,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalPhotoStore {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket,
        })
    }

    /// Convert a key to a filesystem path, rejecting anything that could leave
    /// the base directory.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty()
            || key.contains("..")
            || key.starts_with('/')
            || key.contains('/')
            || key.contains('\\')
        {
            return Err(StorageError::InvalidKey(format!(
                "Storage key contains invalid characters: {}",
                key
            )));
        }

        Ok(self.base_path.join(key))
    }
}

#[async_trait]
impl PhotoStore for LocalPhotoStore {
    async fn put(&self, key: &str, _content_type: &str, data: Vec<u8>) -> StorageResult<String> {
        let path = self.key_to_path(key)?;
        let size = data.len();

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> StorageResult<DeleteOutcome> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(key = %key, "Local photo already absent");
                return Ok(DeleteOutcome::NotFound);
            }
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        tracing::info!(
            path = %path.display(),
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(DeleteOutcome::Deleted)
    }

    fn public_url(&self, key: &str) -> String {
        public_url(&self.base_url, &self.bucket, key)
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        key_from_public_url(&self.base_url, &self.bucket, url)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
