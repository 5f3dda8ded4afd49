//! Storage abstraction trait
//!
//! This module defines the `PhotoStore` trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What a delete found at the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Write interface to the photo store.
///
/// `put` overwrites an existing object under the same key, so retrying it is
/// safe. `delete` reports a missing key as [`DeleteOutcome::NotFound`] rather
/// than an error.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Store `data` under `key` and return its public URL.
    async fn put(&self, key: &str, content_type: &str, data: Vec<u8>) -> StorageResult<String>;

    /// Remove the object stored under `key`.
    async fn delete(&self, key: &str) -> StorageResult<DeleteOutcome>;

    /// Public URL of `key`: `{storage_base}/{bucket}/{key}`.
    fn public_url(&self, key: &str) -> String;

    /// Recover the key from a URL produced by [`PhotoStore::public_url`].
    fn key_from_url(&self, url: &str) -> Option<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
