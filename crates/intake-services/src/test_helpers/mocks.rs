//! Mock store and notifier implementations for testing
//!
//! State lives behind `Arc<Mutex<..>>` so clones observe the same calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use intake_core::models::{StoredSubmission, SubmissionRecord};
use intake_core::{AppError, NotifyError, StorageBackend};
use intake_db::RecordStore;
use intake_storage::keys::{key_from_public_url, public_url};
use intake_storage::{DeleteOutcome, PhotoStore, StorageError, StorageResult};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use crate::notifier::Notifier;

pub const MOCK_STORAGE_BASE: &str = "http://storage.test";
pub const MOCK_BUCKET: &str = "passport-photos";

/// In-memory photo store.
#[derive(Clone, Default)]
pub struct MockPhotoStore {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    put_calls: Arc<Mutex<Vec<String>>>,
    delete_calls: Arc<Mutex<Vec<String>>>,
    /// 1-based put call that fails.
    fail_put_call: Arc<Mutex<Option<usize>>>,
    fail_delete_keys: Arc<Mutex<HashSet<String>>>,
    put_delay: Arc<Mutex<Option<Duration>>>,
    delete_delay: Arc<Mutex<Option<Duration>>>,
}

impl MockPhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `call`-th put (1-based) fail with a backend error.
    pub fn fail_put_on_call(self, call: usize) -> Self {
        *self.fail_put_call.lock().unwrap() = Some(call);
        self
    }

    /// Make every put take `delay` before completing.
    pub fn delay_puts(self, delay: Duration) -> Self {
        *self.put_delay.lock().unwrap() = Some(delay);
        self
    }

    /// Make every delete take `delay` before completing.
    pub fn delay_deletes(self, delay: Duration) -> Self {
        *self.delete_delay.lock().unwrap() = Some(delay);
        self
    }

    /// Make deletes of `key` fail with a backend error.
    pub fn fail_delete_of(&self, key: &str) {
        self.fail_delete_keys.lock().unwrap().insert(key.to_string());
    }

    /// Seed an object without recording a put call.
    pub fn insert_object(&self, key: &str, data: Vec<u8>) {
        self.objects.lock().unwrap().insert(key.to_string(), data);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn put_calls(&self) -> Vec<String> {
        self.put_calls.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PhotoStore for MockPhotoStore {
    async fn put(&self, key: &str, _content_type: &str, data: Vec<u8>) -> StorageResult<String> {
        let call = {
            let mut calls = self.put_calls.lock().unwrap();
            calls.push(key.to_string());
            calls.len()
        };

        let delay = *self.put_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.fail_put_call.lock().unwrap() == Some(call) {
            return Err(StorageError::UploadFailed(format!(
                "injected failure on put #{}",
                call
            )));
        }

        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> StorageResult<DeleteOutcome> {
        self.delete_calls.lock().unwrap().push(key.to_string());

        let delay = *self.delete_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_delete_keys.lock().unwrap().contains(key) {
            return Err(StorageError::DeleteFailed(format!(
                "injected failure deleting {}",
                key
            )));
        }

        match self.objects.lock().unwrap().remove(key) {
            Some(_) => Ok(DeleteOutcome::Deleted),
            None => Ok(DeleteOutcome::NotFound),
        }
    }

    fn public_url(&self, key: &str) -> String {
        public_url(MOCK_STORAGE_BASE, MOCK_BUCKET, key)
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        key_from_public_url(MOCK_STORAGE_BASE, MOCK_BUCKET, url)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// In-memory record store.
#[derive(Clone, Default)]
pub struct MockRecordStore {
    rows: Arc<Mutex<Vec<StoredSubmission>>>,
    insert_calls: Arc<Mutex<usize>>,
    fail_inserts: Arc<Mutex<bool>>,
    select_delay: Arc<Mutex<Option<Duration>>>,
    insert_delay: Arc<Mutex<Option<Duration>>>,
    unreachable: Arc<Mutex<bool>>,
    select_thresholds: Arc<Mutex<Vec<DateTime<Utc>>>>,
    delete_thresholds: Arc<Mutex<Vec<DateTime<Utc>>>>,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every insert fail with a database error.
    pub fn fail_inserts(self) -> Self {
        *self.fail_inserts.lock().unwrap() = true;
        self
    }

    pub fn delay_inserts(self, delay: Duration) -> Self {
        *self.insert_delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn delay_selects(self, delay: Duration) -> Self {
        *self.select_delay.lock().unwrap() = Some(delay);
        self
    }

    /// Make `ping` fail, as if the database were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        *self.unreachable.lock().unwrap() = unreachable;
    }

    /// Seed a row with an explicit creation time.
    pub fn seed(&self, record: SubmissionRecord, created_at: DateTime<Utc>) -> StoredSubmission {
        let stored = StoredSubmission {
            id: Uuid::new_v4(),
            created_at,
            record,
        };
        self.rows.lock().unwrap().push(stored.clone());
        stored
    }

    pub fn rows(&self) -> Vec<StoredSubmission> {
        self.rows.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn insert_calls(&self) -> usize {
        *self.insert_calls.lock().unwrap()
    }

    /// Thresholds passed to `select_older_than`, in call order.
    pub fn select_thresholds(&self) -> Vec<DateTime<Utc>> {
        self.select_thresholds.lock().unwrap().clone()
    }

    /// Thresholds passed to `delete_older_than`, in call order.
    pub fn delete_thresholds(&self) -> Vec<DateTime<Utc>> {
        self.delete_thresholds.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn insert(&self, records: &[SubmissionRecord]) -> Result<Vec<StoredSubmission>, AppError> {
        *self.insert_calls.lock().unwrap() += 1;

        let delay = *self.insert_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.fail_inserts.lock().unwrap() {
            return Err(AppError::Internal("injected insert failure".to_string()));
        }

        let now = Utc::now();
        let stored: Vec<StoredSubmission> = records
            .iter()
            .map(|record| StoredSubmission {
                id: Uuid::new_v4(),
                created_at: now,
                record: record.clone(),
            })
            .collect();
        self.rows.lock().unwrap().extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn select_older_than(
        &self,
        threshold: DateTime<Utc>,
    ) -> Result<Vec<StoredSubmission>, AppError> {
        self.select_thresholds.lock().unwrap().push(threshold);

        let delay = *self.select_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.created_at < threshold)
            .cloned()
            .collect())
    }

    async fn delete_older_than(&self, threshold: DateTime<Utc>) -> Result<u64, AppError> {
        self.delete_thresholds.lock().unwrap().push(threshold);
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.created_at >= threshold);
        Ok((before - rows.len()) as u64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        if *self.unreachable.lock().unwrap() {
            return Err(AppError::Internal("database unreachable".to_string()));
        }
        Ok(())
    }
}

/// Notifier that records every batch it is asked to send.
#[derive(Clone, Default)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<Vec<SubmissionRecord>>>>,
    failure: Arc<Mutex<Option<NotifyError>>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send fail with `error` (the call is still recorded).
    pub fn failing(self, error: NotifyError) -> Self {
        *self.failure.lock().unwrap() = Some(error);
        self
    }

    pub fn delay_sends(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Vec<SubmissionRecord>> {
        self.sent.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, records: &[SubmissionRecord]) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(records.to_vec());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
