#[cfg(feature = "storage-local")]
use crate::LocalPhotoStore;
#[cfg(feature = "storage-s3")]
use crate::S3PhotoStore;
use crate::{PhotoStore, StorageBackend, StorageError, StorageResult};
use intake_core::StorageConfig;
use std::sync::Arc;

/// Create a photo store based on configuration
pub async fn create_photo_store(config: &StorageConfig) -> StorageResult<Arc<dyn PhotoStore>> {
    match config.backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let store = S3PhotoStore::new(
                config.bucket.clone(),
                region,
                config.s3_endpoint.clone(),
                config.public_base_url.clone(),
            )?;
            tracing::info!(bucket = %config.bucket, "Using S3 photo store");
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.storage_base().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;

            let store = LocalPhotoStore::new(&base_path, base_url, config.bucket.clone()).await?;
            tracing::info!(path = %base_path, "Using local photo store");
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
