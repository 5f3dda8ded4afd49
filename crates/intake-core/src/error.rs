//! Error types module
//!
//! Errors that reach the HTTP layer or the CLI are unified under `AppError`.
//! Each variant describes its own presentation (status, code, retry hint, log
//! level) through the `ErrorMetadata` trait.
//!
//! `AppError::Database` wraps `sqlx::Error` only when the `sqlx` feature is on.

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

use crate::pipeline_error::{SubmissionError, ValidationError};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Rejected input, nothing went wrong server-side
    Debug,
    /// Contention or a degraded dependency
    Warn,
    /// Failed I/O or a bug
    Error,
}

/// How an error is presented to HTTP clients and logged
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "UPLOAD_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same request may succeed
    fn is_recoverable(&self) -> bool;

    /// Hint shown next to the message
    fn suggested_action(&self) -> Option<&'static str>;

    /// Message safe to show to the caller
    fn client_message(&self) -> String;

    /// Whether details must stay out of responses
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    Submission(SubmissionError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        AppError::Submission(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Submission(SubmissionError::Validation(err))
    }
}

const RETRY_LATER: Option<&str> = Some("Retry after a short delay");

/// Presentation of one error value.
struct Presentation {
    status: u16,
    code: &'static str,
    recoverable: bool,
    action: Option<&'static str>,
    sensitive: bool,
    level: LogLevel,
}

impl AppError {
    fn presentation(&self) -> Presentation {
        let p = |status: u16,
                 code: &'static str,
                 recoverable: bool,
                 action: Option<&'static str>,
                 sensitive: bool,
                 level: LogLevel| Presentation {
            status,
            code,
            recoverable,
            action,
            sensitive,
            level,
        };

        match self {
            AppError::Database(_) => p(500, "DATABASE_ERROR", true, RETRY_LATER, true, LogLevel::Error),
            AppError::InvalidInput(_) => p(
                400,
                "INVALID_INPUT",
                false,
                Some("Check the form fields and try again"),
                false,
                LogLevel::Debug,
            ),
            AppError::Conflict(_) => p(
                409,
                "CONFLICT",
                true,
                Some("Wait for the running operation to finish"),
                false,
                LogLevel::Warn,
            ),
            AppError::Submission(SubmissionError::Validation(ValidationError::PhotoTooLarge {
                ..
            })) => p(
                413,
                "VALIDATION_ERROR",
                false,
                Some("Reduce each photo to 5 MB or less"),
                false,
                LogLevel::Debug,
            ),
            AppError::Submission(SubmissionError::Validation(_)) => p(
                400,
                "VALIDATION_ERROR",
                false,
                Some("Check the submitted persons and photos"),
                false,
                LogLevel::Debug,
            ),
            AppError::Submission(e @ SubmissionError::UploadFailed { .. }) => p(
                if e.is_timeout() { 504 } else { 502 },
                e.code(),
                true,
                Some("Retry the submission after a short delay"),
                false,
                LogLevel::Error,
            ),
            AppError::Submission(e @ SubmissionError::PersistFailed { .. }) => p(
                if e.is_timeout() { 504 } else { 500 },
                e.code(),
                true,
                Some("Retry the submission after a short delay"),
                false,
                LogLevel::Error,
            ),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                p(500, "INTERNAL_ERROR", true, RETRY_LATER, true, LogLevel::Error)
            }
        }
    }

    /// Variant name reported in non-production error details
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Conflict(_) => "Conflict",
            AppError::Submission(SubmissionError::Validation(_)) => "ValidationError",
            AppError::Submission(SubmissionError::UploadFailed { .. }) => "UploadFailed",
            AppError::Submission(SubmissionError::PersistFailed { .. }) => "PersistFailed",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// The error followed by up to five levels of its source chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();
        let mut current = self.source();
        for _ in 0..5 {
            let Some(err) = current else {
                return details;
            };
            details.push_str(&format!("\n  Caused by: {}", err));
            current = err.source();
        }
        if current.is_some() {
            details.push_str("\n  ... (truncated)");
        }
        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.presentation().status
    }

    fn error_code(&self) -> &'static str {
        self.presentation().code
    }

    fn is_recoverable(&self) -> bool {
        self.presentation().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.presentation().action
    }

    fn is_sensitive(&self) -> bool {
        self.presentation().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.presentation().level
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::InvalidInput(msg) | AppError::Conflict(msg) => msg.clone(),
            // The submitter sees the same status line the pipeline logs.
            AppError::Submission(err) => err.status_message(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline_error::StageFailure;
    use std::time::Duration;

    #[test]
    fn test_error_metadata_database() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_validation() {
        let err = AppError::from(ValidationError::MissingPhoto { position: 0 });
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(!err.is_recoverable());
        assert_eq!(
            err.client_message(),
            "Error: invalid submission: person 1 has no passport photo"
        );
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_oversized_photo() {
        let err = AppError::from(ValidationError::PhotoTooLarge {
            position: 2,
            size: 6_000_000,
            max: 5 * 1024 * 1024,
        });
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_type(), "ValidationError");
    }

    #[test]
    fn test_error_metadata_upload_timeout() {
        let err = AppError::from(SubmissionError::UploadFailed {
            position: 0,
            key: "k.jpg".to_string(),
            cause: StageFailure::Timeout(Duration::from_secs(5)),
            orphaned_keys: vec![],
        });
        assert_eq!(err.http_status_code(), 504);
        assert_eq!(err.error_code(), "UPLOAD_FAILED");
        assert!(err.is_recoverable());
        assert!(!err.is_sensitive());
    }

    #[test]
    fn test_error_metadata_persist_failed() {
        let err = AppError::from(SubmissionError::PersistFailed {
            cause: StageFailure::Backend("connection reset".to_string()),
            orphaned_keys: vec!["a.jpg".to_string()],
        });
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_type(), "PersistFailed");
        assert!(err.client_message().starts_with("Error: saving the submission failed"));
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let err = AppError::from(anyhow::anyhow!("root cause").context("outer"));
        let details = err.detailed_message();
        assert!(details.contains("Internal error with source"));
        assert!(details.contains("Caused by"));
    }
}
