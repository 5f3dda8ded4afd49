//! Submission pipeline
//!
//! Validates a batch of 1 to 5 persons, uploads each photo in batch order,
//! inserts all records in one transaction and then notifies the operator.
//! Validation happens before any I/O. The first upload or insert failure ends
//! the call; photos uploaded before it stay in storage and are reported as
//! orphaned. A notification failure only degrades the outcome.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use intake_core::constants::{MAX_PERSONS_PER_SUBMISSION, MAX_PHOTO_SIZE_BYTES};
use intake_core::models::{
    NotificationStatus, PersonInput, PhotoUpload, SubmissionOutcome, SubmissionRecord,
};
use intake_core::{IntakeConfig, NotifyError, StageFailure, SubmissionError, ValidationError};
use intake_db::RecordStore;
use intake_storage::{photo_keys, PhotoKeyInput, PhotoStore};

use crate::notifier::Notifier;

const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONTENT_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/heic",
    "image/gif",
];

/// Limits and timeouts applied by the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_persons: usize,
    pub max_photo_bytes: usize,
    /// Lowercase MIME types without parameters.
    pub allowed_content_types: Vec<String>,
    /// Upper bound for each upload, the insert and the notification.
    pub io_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_persons: MAX_PERSONS_PER_SUBMISSION,
            max_photo_bytes: MAX_PHOTO_SIZE_BYTES,
            allowed_content_types: DEFAULT_CONTENT_TYPES.iter().map(|s| s.to_string()).collect(),
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }
}

impl PipelineConfig {
    pub fn from_config(config: &IntakeConfig) -> Self {
        Self {
            allowed_content_types: config
                .allowed_content_types
                .iter()
                .map(|ct| normalize_content_type(ct))
                .collect(),
            io_timeout: config.io_timeout,
            ..Self::default()
        }
    }
}

/// Lowercase a MIME type, drop its parameters and fold common aliases.
pub fn normalize_content_type(content_type: &str) -> String {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    match mime.as_str() {
        "image/jpg" | "image/pjpeg" => "image/jpeg".to_string(),
        _ => mime,
    }
}

pub struct SubmissionPipeline {
    photos: Arc<dyn PhotoStore>,
    records: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
    config: PipelineConfig,
}

impl SubmissionPipeline {
    pub fn new(
        photos: Arc<dyn PhotoStore>,
        records: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            photos,
            records,
            notifier,
            config,
        }
    }

    /// Process a batch with the current time as the submission instant.
    pub async fn submit(
        &self,
        batch: Vec<PersonInput>,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        self.submit_at(batch, Utc::now()).await
    }

    /// Process a batch. `submitted_at` is the single instant all photo keys share.
    #[tracing::instrument(skip(self, batch), fields(persons = batch.len()))]
    pub async fn submit_at(
        &self,
        batch: Vec<PersonInput>,
        submitted_at: DateTime<Utc>,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        let accepted = self.validate(batch).map_err(|e| {
            tracing::debug!(error = %e, position = ?e.position(), "Submission rejected");
            SubmissionError::from(e)
        })?;

        let keys = {
            let inputs: Vec<PhotoKeyInput<'_>> = accepted
                .iter()
                .map(|(person, photo)| PhotoKeyInput {
                    full_name: &person.full_name,
                    original_filename: &photo.original_filename,
                    content_type: &photo.content_type,
                })
                .collect();
            photo_keys(submitted_at.timestamp_millis(), &inputs)
        };

        let mut uploaded: Vec<String> = Vec::with_capacity(accepted.len());
        let mut records: Vec<SubmissionRecord> = Vec::with_capacity(accepted.len());

        for (position, ((person, photo), key)) in accepted.into_iter().zip(keys).enumerate() {
            let size = photo.size();
            let upload = self.photos.put(&key, &photo.content_type, photo.data);

            match self.bounded(upload).await {
                Ok(Ok(url)) => {
                    tracing::debug!(position, key = %key, size_bytes = size, "Photo uploaded");
                    records.push(SubmissionRecord::from_person(&person, url));
                    uploaded.push(key);
                }
                Ok(Err(e)) => {
                    return Err(self.abort(SubmissionError::UploadFailed {
                        position,
                        key,
                        cause: StageFailure::Backend(e.to_string()),
                        orphaned_keys: uploaded,
                    }));
                }
                Err(elapsed) => {
                    return Err(self.abort(SubmissionError::UploadFailed {
                        position,
                        key,
                        cause: StageFailure::Timeout(elapsed),
                        orphaned_keys: uploaded,
                    }));
                }
            }
        }

        let stored = match self.bounded(self.records.insert(&records)).await {
            Ok(Ok(stored)) => stored,
            Ok(Err(e)) => {
                return Err(self.abort(SubmissionError::PersistFailed {
                    cause: StageFailure::Backend(e.to_string()),
                    orphaned_keys: uploaded,
                }));
            }
            Err(elapsed) => {
                return Err(self.abort(SubmissionError::PersistFailed {
                    cause: StageFailure::Timeout(elapsed),
                    orphaned_keys: uploaded,
                }));
            }
        };

        let notification = match self.notify(&records).await {
            Ok(()) => NotificationStatus::Sent,
            Err(e) => {
                tracing::warn!(error = %e, records = records.len(), "Submission saved but notification failed");
                NotificationStatus::Failed(e.to_string())
            }
        };

        tracing::info!(
            records = stored.len(),
            notified = notification.is_sent(),
            "Submission accepted"
        );

        Ok(SubmissionOutcome {
            records: stored,
            notification,
        })
    }

    /// Send the summary of `records` to the operator under the I/O timeout.
    pub async fn notify(&self, records: &[SubmissionRecord]) -> Result<(), NotifyError> {
        match self.bounded(self.notifier.send(records)).await {
            Ok(result) => result,
            Err(elapsed) => Err(NotifyError::Timeout(elapsed)),
        }
    }

    /// Check every person before any I/O. Returns each person paired with its photo.
    fn validate(
        &self,
        batch: Vec<PersonInput>,
    ) -> Result<Vec<(PersonInput, PhotoUpload)>, ValidationError> {
        if batch.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }
        if batch.len() > self.config.max_persons {
            return Err(ValidationError::TooManyPersons {
                count: batch.len(),
                max: self.config.max_persons,
            });
        }

        let mut accepted = Vec::with_capacity(batch.len());
        for (position, person) in batch.into_iter().enumerate() {
            let mut person = person.normalized();

            if person.full_name.is_empty() {
                return Err(ValidationError::MissingField {
                    position,
                    field: "full_name",
                });
            }
            if person.passport_number.is_empty() {
                return Err(ValidationError::MissingField {
                    position,
                    field: "passport_number",
                });
            }

            let mut photo = person
                .photo
                .take()
                .ok_or(ValidationError::MissingPhoto { position })?;
            if photo.size() == 0 {
                return Err(ValidationError::EmptyPhoto { position });
            }
            if photo.size() > self.config.max_photo_bytes {
                return Err(ValidationError::PhotoTooLarge {
                    position,
                    size: photo.size(),
                    max: self.config.max_photo_bytes,
                });
            }

            let content_type = normalize_content_type(&photo.content_type);
            if !self.config.allowed_content_types.contains(&content_type) {
                return Err(ValidationError::UnsupportedContentType {
                    position,
                    content_type: photo.content_type,
                });
            }
            photo.content_type = content_type;

            accepted.push((person, photo));
        }

        Ok(accepted)
    }

    async fn bounded<F: Future>(&self, fut: F) -> Result<F::Output, Duration> {
        tokio::time::timeout(self.config.io_timeout, fut)
            .await
            .map_err(|_| self.config.io_timeout)
    }

    fn abort(&self, err: SubmissionError) -> SubmissionError {
        let orphaned = err.orphaned_keys();
        if orphaned.is_empty() {
            tracing::error!(stage = err.stage(), error = %err, "Submission failed");
        } else {
            tracing::warn!(
                stage = err.stage(),
                error = %err,
                orphaned_keys = ?orphaned,
                "Submission failed; uploaded photos left orphaned"
            );
        }
        err
    }
}
