//! Fixed limits of the submission domain.

/// Maximum number of persons accepted in one submission.
pub const MAX_PERSONS_PER_SUBMISSION: usize = 5;

/// Maximum photo size in bytes (5 MiB).
pub const MAX_PHOTO_SIZE_BYTES: usize = 5 * 1024 * 1024;

/// Default age after which submissions are purged.
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Longest accepted retention period (about a century).
pub const MAX_RETENTION_DAYS: i64 = 36_500;

/// Default bucket holding passport photos.
pub const DEFAULT_BUCKET: &str = "passport-photos";

/// Marker rendered for optional fields the person left empty.
pub const NOT_PROVIDED: &str = "N/A";

/// API path prefix.
pub const API_PREFIX: &str = "/api/v0";
