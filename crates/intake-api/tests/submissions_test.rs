mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::{add_person, setup_test_app, setup_test_app_with};
use intake_core::NotifyError;
use intake_services::test_helpers::{MockNotifier, MockPhotoStore, MockRecordStore};
use serde_json::Value;

const MIB: usize = 1024 * 1024;

#[tokio::test]
async fn single_person_is_accepted() {
    let app = setup_test_app();
    let form = add_person(MultipartForm::new(), 0, "Jane Doe", "X1", 2 * 1000 * 1000);

    let response = app.server.post("/api/v0/submissions").multipart(form).await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["status"], "Data saved and email sent successfully");
    assert_eq!(body["code"], "SUCCESS");
    assert_eq!(body["notification"]["state"], "sent");

    let accepted = body["accepted"].as_array().expect("accepted array");
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0]["full_name"], "Jane Doe");
    assert_eq!(accepted[0]["country"], "Belgium");
    assert!(accepted[0]["photo_url"]
        .as_str()
        .unwrap()
        .ends_with("_Jane_Doe.jpg"));

    assert_eq!(app.records.len(), 1);
    assert_eq!(app.notifier.call_count(), 1);
}

#[tokio::test]
async fn persons_keep_their_form_order() {
    let app = setup_test_app();
    let mut form = MultipartForm::new();
    // Parts arrive out of index order.
    form = add_person(form, 1, "John Roe", "X2", 1024);
    form = add_person(form, 0, "Jane Doe", "X1", 1024);

    let response = app.server.post("/api/v0/submissions").multipart(form).await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["accepted"][0]["full_name"], "Jane Doe");
    assert_eq!(body["accepted"][1]["full_name"], "John Roe");
}

#[tokio::test]
async fn oversized_photo_returns_error_envelope() {
    let app = setup_test_app();
    let form = add_person(MultipartForm::new(), 0, "Jane Doe", "X1", 5 * MIB + 1);

    let response = app.server.post("/api/v0/submissions").multipart(form).await;

    assert_eq!(response.status_code(), 413);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().starts_with("Error: "));
    assert!(app.photos.put_calls().is_empty());
    assert!(app.records.is_empty());
}

#[tokio::test]
async fn six_persons_are_rejected() {
    let app = setup_test_app();
    let mut form = MultipartForm::new();
    for i in 0..6 {
        form = add_person(form, i, &format!("Person {}", i), "X", 16);
    }

    let response = app.server.post("/api/v0/submissions").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert!(app.photos.put_calls().is_empty());
}

#[tokio::test]
async fn missing_photo_names_the_person() {
    let app = setup_test_app();
    let form = MultipartForm::new()
        .add_text("persons[0][full_name]", "Jane Doe")
        .add_text("persons[0][passport_number]", "X1");

    let response = app.server.post("/api/v0/submissions").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Error: "));
    assert!(error.contains("person 1 has no passport photo"));
}

#[tokio::test]
async fn blank_file_input_counts_as_missing_photo() {
    let app = setup_test_app();
    let form = MultipartForm::new()
        .add_text("persons[0][full_name]", "Jane Doe")
        .add_text("persons[0][passport_number]", "X1")
        .add_part(
            "persons[0][photo]",
            Part::bytes(Vec::<u8>::new())
                .file_name("")
                .mime_type("application/octet-stream"),
        );

    let response = app.server.post("/api/v0/submissions").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Error: "));
    assert!(error.contains("person 1 has no passport photo"));
}

#[tokio::test]
async fn gap_in_person_indexes_is_rejected() {
    let app = setup_test_app();
    let form = add_person(MultipartForm::new(), 1, "Jane Doe", "X1", 16);

    let response = app.server.post("/api/v0/submissions").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn upload_failure_is_reported_without_records() {
    let app = setup_test_app_with(
        MockPhotoStore::new().fail_put_on_call(2),
        MockRecordStore::new(),
        MockNotifier::new(),
    );
    let mut form = add_person(MultipartForm::new(), 0, "Jane Doe", "X1", 16);
    form = add_person(form, 1, "John Roe", "X2", 16);

    let response = app.server.post("/api/v0/submissions").multipart(form).await;

    assert_eq!(response.status_code(), 502);
    let body: Value = response.json();
    assert_eq!(body["code"], "UPLOAD_FAILED");
    assert_eq!(body["recoverable"], true);
    assert!(app.records.is_empty());
}

#[tokio::test]
async fn notification_failure_still_accepts() {
    let app = setup_test_app_with(
        MockPhotoStore::new(),
        MockRecordStore::new(),
        MockNotifier::new().failing(NotifyError::Delivery("relay down".to_string())),
    );
    let form = add_person(MultipartForm::new(), 0, "Jane Doe", "X1", 16);

    let response = app.server.post("/api/v0/submissions").multipart(form).await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["code"], "NOTIFY_FAILED");
    assert_eq!(body["notification"]["state"], "failed");
    assert!(body["status"].as_str().unwrap().contains("relay down"));
    assert_eq!(app.records.len(), 1);
}

#[tokio::test]
async fn non_multipart_body_is_rejected() {
    let app = setup_test_app();

    let response = app
        .server
        .post("/api/v0/submissions")
        .json(&serde_json::json!({ "persons": [] }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}
