//! Photo storage for passport submissions.
//!
//! Provides the `PhotoStore` trait with S3 (`object_store`) and local filesystem
//! backends, plus the key derivation shared by every backend.
//!
//! # Key and URL format
//!
//! Keys are flat: `{epoch_millis}_{sanitized_name}.{ext}`, see [`keys::photo_keys`].
//! Every backend publishes a photo at `{storage_base}/{bucket}/{key}` and
//! inverts exactly that shape in `key_from_url`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_photo_store;
pub use intake_core::StorageBackend;
pub use keys::{photo_keys, sanitize_name, PhotoKeyInput};
#[cfg(feature = "storage-local")]
pub use local::LocalPhotoStore;
#[cfg(feature = "storage-s3")]
pub use s3::S3PhotoStore;
pub use traits::{DeleteOutcome, PhotoStore, StorageError, StorageResult};
