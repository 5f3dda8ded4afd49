//! Passport Intake Core Library
//!
//! This crate provides the domain models, error taxonomy and configuration shared
//! by the storage, database, service and API crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod pipeline_error;
pub mod storage_types;

// Re-export commonly used types
pub use config::{IntakeConfig, NotifyConfig, StorageConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use pipeline_error::{NotifyError, StageFailure, SubmissionError, ValidationError};
pub use storage_types::StorageBackend;
