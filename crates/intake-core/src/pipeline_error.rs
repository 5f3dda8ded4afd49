//! Failure taxonomy of the submission pipeline.
//!
//! Validation failures happen before any I/O. Upload and persist failures are
//! terminal and carry the keys of photos that were already written (the pipeline
//! never deletes them). Notification failures are not terminal; they surface as a
//! degraded success.

use std::time::Duration;

/// Why an I/O stage did not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageFailure {
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("{0}")]
    Backend(String),
}

impl StageFailure {
    pub fn is_timeout(&self) -> bool {
        matches!(self, StageFailure::Timeout(_))
    }
}

/// Caller-side problems detected before any upload begins.
///
/// Positions are zero-based batch indexes; messages show them one-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("a submission must contain at least one person")]
    EmptyBatch,

    #[error("a submission may contain at most {max} persons, got {count}")]
    TooManyPersons { count: usize, max: usize },

    #[error("person {} has no passport photo", .position + 1)]
    MissingPhoto { position: usize },

    #[error("person {} photo is empty", .position + 1)]
    EmptyPhoto { position: usize },

    #[error(
        "person {} photo is {size} bytes, exceeding the limit of {} MB",
        .position + 1,
        .max / 1024 / 1024
    )]
    PhotoTooLarge {
        position: usize,
        size: usize,
        max: usize,
    },

    #[error("person {} is missing required field '{field}'", .position + 1)]
    MissingField {
        position: usize,
        field: &'static str,
    },

    #[error("person {} photo has unsupported content type '{content_type}'", .position + 1)]
    UnsupportedContentType {
        position: usize,
        content_type: String,
    },
}

impl ValidationError {
    /// Batch index of the offending person, when the error concerns one person.
    pub fn position(&self) -> Option<usize> {
        match self {
            ValidationError::EmptyBatch | ValidationError::TooManyPersons { .. } => None,
            ValidationError::MissingPhoto { position }
            | ValidationError::EmptyPhoto { position }
            | ValidationError::PhotoTooLarge { position, .. }
            | ValidationError::MissingField { position, .. }
            | ValidationError::UnsupportedContentType { position, .. } => Some(*position),
        }
    }
}

/// Terminal failure of a submission. Exactly one is reported per call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("invalid submission: {0}")]
    Validation(#[from] ValidationError),

    #[error("photo upload failed for person {} ({key}): {cause}", .position + 1)]
    UploadFailed {
        position: usize,
        key: String,
        cause: StageFailure,
        orphaned_keys: Vec<String>,
    },

    #[error("saving the submission failed: {cause}")]
    PersistFailed {
        cause: StageFailure,
        orphaned_keys: Vec<String>,
    },
}

impl SubmissionError {
    /// Name of the pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            SubmissionError::Validation(_) => "validation",
            SubmissionError::UploadFailed { .. } => "upload",
            SubmissionError::PersistFailed { .. } => "persist",
        }
    }

    /// Machine-readable outcome code.
    pub fn code(&self) -> &'static str {
        match self {
            SubmissionError::Validation(_) => "VALIDATION_ERROR",
            SubmissionError::UploadFailed { .. } => "UPLOAD_FAILED",
            SubmissionError::PersistFailed { .. } => "PERSIST_FAILED",
        }
    }

    /// Human-readable status shown to the submitter.
    pub fn status_message(&self) -> String {
        format!("Error: {}", self)
    }

    /// Photos written during the failed attempt that no record references.
    pub fn orphaned_keys(&self) -> &[String] {
        match self {
            SubmissionError::Validation(_) => &[],
            SubmissionError::UploadFailed { orphaned_keys, .. }
            | SubmissionError::PersistFailed { orphaned_keys, .. } => orphaned_keys,
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            SubmissionError::Validation(_) => false,
            SubmissionError::UploadFailed { cause, .. }
            | SubmissionError::PersistFailed { cause, .. } => cause.is_timeout(),
        }
    }
}

/// Notification delivery problems. Never fatal for a submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    #[error("nothing to notify")]
    Empty,

    #[error("notifier not configured: {0}")]
    NotConfigured(String),

    #[error("invalid email address: {0}")]
    Address(String),

    #[error("failed to build email: {0}")]
    Build(String),

    #[error("email delivery failed: {0}")]
    Delivery(String),

    #[error("notification timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}
