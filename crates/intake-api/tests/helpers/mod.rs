//! Test server wired to in-memory stores.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use intake_api::setup::routes::setup_routes;
use intake_api::AppState;
use intake_services::test_helpers::{
    create_test_pipeline_with, jpeg_bytes, MockNotifier, MockPhotoStore, MockRecordStore,
};
use intake_services::PipelineConfig;

pub struct TestApp {
    pub server: TestServer,
    pub photos: Arc<MockPhotoStore>,
    pub records: Arc<MockRecordStore>,
    pub notifier: Arc<MockNotifier>,
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(
        MockPhotoStore::new(),
        MockRecordStore::new(),
        MockNotifier::new(),
    )
}

pub fn setup_test_app_with(
    photos: MockPhotoStore,
    records: MockRecordStore,
    notifier: MockNotifier,
) -> TestApp {
    let t = create_test_pipeline_with(photos, records, notifier, PipelineConfig::default());
    let state = Arc::new(AppState::new(Arc::new(t.pipeline), t.records.clone()));

    let app = setup_routes(&["*".to_string()], state);
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        photos: t.photos,
        records: t.records,
        notifier: t.notifier,
    }
}

/// Append one person's text fields and a JPEG photo of `photo_size` bytes.
pub fn add_person(
    form: MultipartForm,
    index: usize,
    full_name: &str,
    passport_number: &str,
    photo_size: usize,
) -> MultipartForm {
    let photo = Part::bytes(jpeg_bytes(photo_size))
        .file_name("passport.jpg")
        .mime_type("image/jpeg");

    form.add_text(format!("persons[{}][full_name]", index), full_name.to_string())
        .add_text(
            format!("persons[{}][passport_number]", index),
            passport_number.to_string(),
        )
        .add_text(format!("persons[{}][date_of_birth]", index), "1990-01-01")
        .add_text(format!("persons[{}][expiry_date]", index), "2030-01-01")
        .add_text(format!("persons[{}][country]", index), "Belgium")
        .add_part(format!("persons[{}][photo]", index), photo)
}
