//! Retention sweep
//!
//! Removes submissions older than the retention period together with their
//! photos. Photo problems are logged and counted but never stop the sweep; the
//! row delete always runs with the same threshold the candidates were selected
//! with.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use intake_core::constants::DEFAULT_RETENTION_DAYS;
use intake_core::models::StoredSubmission;
use intake_core::AppError;
use intake_db::RecordStore;
use intake_storage::{DeleteOutcome, PhotoStore};
use serde::Serialize;

const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    Idle,
    Running,
}

/// What one sweep did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub threshold: DateTime<Utc>,
    /// Rows selected as older than the threshold.
    pub candidates: usize,
    pub photos_deleted: usize,
    /// Photos that were already gone.
    pub photos_missing: usize,
    /// Photo deletes that errored, timed out or had an unparseable URL.
    pub photo_failures: usize,
    pub rows_deleted: u64,
}

impl SweepReport {
    fn empty(threshold: DateTime<Utc>) -> Self {
        Self {
            threshold,
            candidates: 0,
            photos_deleted: 0,
            photos_missing: 0,
            photo_failures: 0,
            rows_deleted: 0,
        }
    }

    /// No photo trouble and every candidate row removed.
    pub fn is_clean(&self) -> bool {
        self.photo_failures == 0
            && self.photos_missing == 0
            && self.rows_deleted == self.candidates as u64
    }
}

pub struct RetentionSweeper {
    photos: Arc<dyn PhotoStore>,
    records: Arc<dyn RecordStore>,
    retention: chrono::Duration,
    io_timeout: Duration,
    running: AtomicBool,
}

/// Resets the sweeper to idle when a run ends, however it ends.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl RetentionSweeper {
    pub fn new(photos: Arc<dyn PhotoStore>, records: Arc<dyn RecordStore>) -> Self {
        Self {
            photos,
            records,
            retention: chrono::Duration::days(DEFAULT_RETENTION_DAYS),
            io_timeout: DEFAULT_IO_TIMEOUT,
            running: AtomicBool::new(false),
        }
    }

    pub fn with_retention(mut self, retention: chrono::Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_io_timeout(mut self, io_timeout: Duration) -> Self {
        self.io_timeout = io_timeout;
        self
    }

    pub fn state(&self) -> SweepState {
        if self.running.load(Ordering::Acquire) {
            SweepState::Running
        } else {
            SweepState::Idle
        }
    }

    /// `now` minus the retention period. Fails when the result is not representable.
    pub fn threshold_at(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, AppError> {
        now.checked_sub_signed(self.retention).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "retention of {} days reaches before the earliest representable date",
                self.retention.num_days()
            ))
        })
    }

    /// Sweep everything older than the retention period, measured from now.
    pub async fn run(&self) -> Result<SweepReport, AppError> {
        self.run_at(Utc::now()).await
    }

    /// Sweep with `now` as the reference instant.
    ///
    /// A run started while another is in progress is rejected with `Conflict`.
    #[tracing::instrument(skip(self), fields(retention_days = self.retention.num_days()))]
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<SweepReport, AppError> {
        let _guard = self.acquire()?;
        let threshold = self.threshold_at(now)?;

        let candidates = self
            .bounded("select", self.records.select_older_than(threshold))
            .await?;

        if candidates.is_empty() {
            tracing::info!(threshold = %threshold, "No old submissions to delete");
            return Ok(SweepReport::empty(threshold));
        }

        let mut report = SweepReport::empty(threshold);
        report.candidates = candidates.len();

        for submission in &candidates {
            self.delete_photo(submission, &mut report).await;
        }

        report.rows_deleted = self
            .bounded("delete", self.records.delete_older_than(threshold))
            .await?;

        if report.rows_deleted != report.candidates as u64 {
            tracing::warn!(
                candidates = report.candidates,
                rows_deleted = report.rows_deleted,
                "Deleted row count differs from selected candidates"
            );
        }
        if report.photo_failures > 0 {
            tracing::warn!(
                photo_failures = report.photo_failures,
                "Retention sweep left photos behind"
            );
        }

        tracing::info!(
            threshold = %threshold,
            rows_deleted = report.rows_deleted,
            photos_deleted = report.photos_deleted,
            photos_missing = report.photos_missing,
            photo_failures = report.photo_failures,
            "Deleted {} old submissions",
            report.rows_deleted
        );

        Ok(report)
    }

    /// List what a sweep at `now` would delete, without deleting anything.
    pub async fn preview_at(&self, now: DateTime<Utc>) -> Result<Vec<StoredSubmission>, AppError> {
        let threshold = self.threshold_at(now)?;
        self.bounded("select", self.records.select_older_than(threshold))
            .await
    }

    fn acquire(&self) -> Result<RunGuard<'_>, AppError> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AppError::Conflict("retention sweep already running".to_string()))?;
        Ok(RunGuard(&self.running))
    }

    async fn delete_photo(&self, submission: &StoredSubmission, report: &mut SweepReport) {
        let url = &submission.record.photo_url;
        let Some(key) = self.photos.key_from_url(url) else {
            report.photo_failures += 1;
            tracing::warn!(
                submission_id = %submission.id,
                photo_url = %url,
                "Retention partial failure: photo URL does not belong to this store"
            );
            return;
        };

        match tokio::time::timeout(self.io_timeout, self.photos.delete(&key)).await {
            Ok(Ok(DeleteOutcome::Deleted)) => report.photos_deleted += 1,
            Ok(Ok(DeleteOutcome::NotFound)) => {
                report.photos_missing += 1;
                tracing::warn!(
                    submission_id = %submission.id,
                    key = %key,
                    "Retention partial failure: photo already missing"
                );
            }
            Ok(Err(e)) => {
                report.photo_failures += 1;
                tracing::warn!(
                    submission_id = %submission.id,
                    key = %key,
                    error = %e,
                    "Retention partial failure: photo delete failed"
                );
            }
            Err(_) => {
                report.photo_failures += 1;
                tracing::warn!(
                    submission_id = %submission.id,
                    key = %key,
                    timeout_secs = self.io_timeout.as_secs(),
                    "Retention partial failure: photo delete timed out"
                );
            }
        }
    }

    async fn bounded<T, F>(&self, operation: &str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match tokio::time::timeout(self.io_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Internal(format!(
                "record store {} timed out after {}s",
                operation,
                self.io_timeout.as_secs()
            ))),
        }
    }
}
