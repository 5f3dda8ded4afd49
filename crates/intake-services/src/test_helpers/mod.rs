//! Test helpers for pipeline and sweeper tests
//!
//! In-memory implementations of the photo store, record store and notifier
//! with failure injection, plus fixtures. No database, bucket or SMTP server
//! is needed.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::{MockNotifier, MockPhotoStore, MockRecordStore, MOCK_BUCKET, MOCK_STORAGE_BASE};

use std::sync::Arc;

use crate::{PipelineConfig, SubmissionPipeline};

/// Pipeline wired to fresh mocks, with handles to inspect them.
pub struct TestPipeline {
    pub pipeline: SubmissionPipeline,
    pub photos: Arc<MockPhotoStore>,
    pub records: Arc<MockRecordStore>,
    pub notifier: Arc<MockNotifier>,
}

/// Create a pipeline over new mocks with the default limits.
pub fn create_test_pipeline() -> TestPipeline {
    create_test_pipeline_with(
        MockPhotoStore::new(),
        MockRecordStore::new(),
        MockNotifier::new(),
        PipelineConfig::default(),
    )
}

/// Create a pipeline over the given mocks.
pub fn create_test_pipeline_with(
    photos: MockPhotoStore,
    records: MockRecordStore,
    notifier: MockNotifier,
    config: PipelineConfig,
) -> TestPipeline {
    let photos = Arc::new(photos);
    let records = Arc::new(records);
    let notifier = Arc::new(notifier);
    let pipeline = SubmissionPipeline::new(
        photos.clone(),
        records.clone(),
        notifier.clone(),
        config,
    );

    TestPipeline {
        pipeline,
        photos,
        records,
        notifier,
    }
}
