//! End-to-end pipeline behavior against in-memory stores.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use intake_core::models::{NotificationStatus, PhotoUpload};
use intake_core::{NotifyError, SubmissionError, ValidationError};
use intake_services::test_helpers::{
    create_test_pipeline, create_test_pipeline_with, person, person_with_photo, MockNotifier,
    MockPhotoStore, MockRecordStore,
};
use intake_services::PipelineConfig;

const MIB: usize = 1024 * 1024;

#[tokio::test]
async fn valid_batches_of_one_to_five_create_one_record_each() {
    let names = ["Ada Lovelace", "Alan Turing", "Grace Hopper", "Edsger Dijkstra", "Barbara Liskov"];

    for size in 1..=5 {
        let t = create_test_pipeline();
        let batch = names[..size]
            .iter()
            .enumerate()
            .map(|(i, name)| person(name, &format!("P{}", i)))
            .collect();

        let outcome = t.pipeline.submit(batch).await.unwrap();

        assert_eq!(outcome.records.len(), size);
        assert_eq!(t.records.len(), size);
        assert_eq!(t.photos.put_calls().len(), size);
        assert!(outcome
            .records
            .iter()
            .all(|stored| !stored.record.photo_url.is_empty()));
        assert_eq!(outcome.notification, NotificationStatus::Sent);
    }
}

#[tokio::test]
async fn jane_doe_end_to_end() {
    let t = create_test_pipeline();
    let submitted_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    let outcome = t
        .pipeline
        .submit_at(vec![person_with_photo("Jane Doe", "X1", 2 * 1000 * 1000)], submitted_at)
        .await
        .unwrap();

    assert_eq!(outcome.records.len(), 1);
    let url = &outcome.records[0].record.photo_url;
    let expected_key = format!("{}_Jane_Doe.jpg", submitted_at.timestamp_millis());
    assert!(url.ends_with(&expected_key), "unexpected url {}", url);
    assert!(t.photos.contains(&expected_key));

    assert_eq!(t.notifier.call_count(), 1);
    let sent = &t.notifier.calls()[0];
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].full_name, "Jane Doe");
    assert_eq!(sent[0].photo_url, *url);

    assert_eq!(outcome.status_message(), "Data saved and email sent successfully");
}

#[tokio::test]
async fn duplicate_names_get_distinct_keys() {
    let t = create_test_pipeline();

    let outcome = t
        .pipeline
        .submit(vec![person("Jane Doe", "X1"), person("Jane Doe", "X2")])
        .await
        .unwrap();

    let calls = t.photos.put_calls();
    assert_eq!(calls.len(), 2);
    assert_ne!(calls[0], calls[1]);
    assert_ne!(
        outcome.records[0].record.photo_url,
        outcome.records[1].record.photo_url
    );
    assert_eq!(t.photos.object_count(), 2);
}

#[tokio::test]
async fn oversized_photo_is_rejected_before_any_upload() {
    let t = create_test_pipeline();

    let err = t
        .pipeline
        .submit(vec![
            person("Jane Doe", "X1"),
            person_with_photo("John Roe", "X2", 5 * MIB + 1),
        ])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SubmissionError::Validation(ValidationError::PhotoTooLarge { position: 1, .. })
    ));
    assert!(t.photos.put_calls().is_empty());
    assert!(t.records.is_empty());
    assert_eq!(t.notifier.call_count(), 0);
}

#[tokio::test]
async fn photo_of_exactly_five_mib_is_accepted() {
    let t = create_test_pipeline();
    let outcome = t
        .pipeline
        .submit(vec![person_with_photo("Jane Doe", "X1", 5 * MIB)])
        .await
        .unwrap();
    assert_eq!(outcome.records.len(), 1);
}

#[tokio::test]
async fn batch_size_limits_are_enforced() {
    let t = create_test_pipeline();

    let err = t.pipeline.submit(vec![]).await.unwrap_err();
    assert_eq!(err, SubmissionError::Validation(ValidationError::EmptyBatch));

    let six = (0..6).map(|i| person(&format!("Person {}", i), "X")).collect();
    let err = t.pipeline.submit(six).await.unwrap_err();
    assert_eq!(
        err,
        SubmissionError::Validation(ValidationError::TooManyPersons { count: 6, max: 5 })
    );
    assert!(t.photos.put_calls().is_empty());
}

#[tokio::test]
async fn missing_photo_and_blank_fields_name_the_person() {
    let t = create_test_pipeline();

    let mut no_photo = person("John Roe", "X2");
    no_photo.photo = None;
    let err = t
        .pipeline
        .submit(vec![person("Jane Doe", "X1"), no_photo])
        .await
        .unwrap_err();
    assert_eq!(
        err,
        SubmissionError::Validation(ValidationError::MissingPhoto { position: 1 })
    );

    let err = t
        .pipeline
        .submit(vec![person("   ", "X1")])
        .await
        .unwrap_err();
    assert_eq!(
        err,
        SubmissionError::Validation(ValidationError::MissingField {
            position: 0,
            field: "full_name"
        })
    );
    assert!(err.status_message().starts_with("Error: "));
    assert!(t.photos.put_calls().is_empty());
}

#[tokio::test]
async fn disallowed_content_type_is_rejected() {
    let t = create_test_pipeline();
    let mut pdf = person("Jane Doe", "X1");
    pdf.photo = Some(PhotoUpload::new("scan.pdf", "application/pdf", vec![1, 2, 3]));

    let err = t.pipeline.submit(vec![pdf]).await.unwrap_err();
    assert!(matches!(
        err,
        SubmissionError::Validation(ValidationError::UnsupportedContentType { position: 0, .. })
    ));
}

#[tokio::test]
async fn second_upload_failure_aborts_without_records() {
    let t = create_test_pipeline_with(
        MockPhotoStore::new().fail_put_on_call(2),
        MockRecordStore::new(),
        MockNotifier::new(),
        PipelineConfig::default(),
    );

    let err = t
        .pipeline
        .submit(vec![
            person("Jane Doe", "X1"),
            person("John Roe", "X2"),
            person("Max Mustermann", "X3"),
        ])
        .await
        .unwrap_err();

    match &err {
        SubmissionError::UploadFailed {
            position,
            orphaned_keys,
            ..
        } => {
            assert_eq!(*position, 1);
            assert_eq!(orphaned_keys.len(), 1);
            assert!(t.photos.contains(&orphaned_keys[0]));
        }
        other => panic!("expected UploadFailed, got {:?}", other),
    }
    // The third person is never attempted.
    assert_eq!(t.photos.put_calls().len(), 2);
    assert_eq!(t.records.insert_calls(), 0);
    assert!(t.records.is_empty());
    assert_eq!(t.notifier.call_count(), 0);
}

#[tokio::test]
async fn insert_failure_reports_orphans() {
    let t = create_test_pipeline_with(
        MockPhotoStore::new(),
        MockRecordStore::new().fail_inserts(),
        MockNotifier::new(),
        PipelineConfig::default(),
    );

    let err = t
        .pipeline
        .submit(vec![person("Jane Doe", "X1"), person("John Roe", "X2")])
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "persist");
    assert_eq!(err.orphaned_keys().len(), 2);
    assert!(t.records.is_empty());
    assert_eq!(t.notifier.call_count(), 0);
}

#[tokio::test]
async fn notification_failure_keeps_records() {
    let t = create_test_pipeline_with(
        MockPhotoStore::new(),
        MockRecordStore::new(),
        MockNotifier::new().failing(NotifyError::Delivery("connection refused".to_string())),
        PipelineConfig::default(),
    );

    let outcome = t
        .pipeline
        .submit(vec![person("Jane Doe", "X1")])
        .await
        .unwrap();

    assert_eq!(t.records.len(), 1);
    assert!(!outcome.notification.is_sent());
    assert_eq!(outcome.status_code(), "NOTIFY_FAILED");
    assert!(outcome.status_message().contains("connection refused"));
}

#[tokio::test(start_paused = true)]
async fn slow_upload_times_out() {
    let config = PipelineConfig {
        io_timeout: Duration::from_secs(2),
        ..PipelineConfig::default()
    };
    let t = create_test_pipeline_with(
        MockPhotoStore::new().delay_puts(Duration::from_secs(10)),
        MockRecordStore::new(),
        MockNotifier::new(),
        config,
    );

    let err = t
        .pipeline
        .submit(vec![person("Jane Doe", "X1")])
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "upload");
    assert!(err.is_timeout());
    assert!(t.records.is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_insert_times_out_and_reports_orphans() {
    let config = PipelineConfig {
        io_timeout: Duration::from_secs(2),
        ..PipelineConfig::default()
    };
    let t = create_test_pipeline_with(
        MockPhotoStore::new(),
        MockRecordStore::new().delay_inserts(Duration::from_secs(10)),
        MockNotifier::new(),
        config,
    );

    let err = t
        .pipeline
        .submit(vec![person("Jane Doe", "X1"), person("John Roe", "X2")])
        .await
        .unwrap_err();

    assert!(matches!(err, SubmissionError::PersistFailed { .. }));
    assert_eq!(err.stage(), "persist");
    assert!(err.is_timeout());
    assert_eq!(err.orphaned_keys(), t.photos.put_calls().as_slice());
    assert_eq!(err.orphaned_keys().len(), 2);
    assert!(t.photos.contains(&err.orphaned_keys()[0]));
    assert_eq!(t.records.insert_calls(), 1);
    assert!(t.records.is_empty());
    assert_eq!(t.notifier.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn slow_notification_degrades_to_timeout_status() {
    let config = PipelineConfig {
        io_timeout: Duration::from_secs(2),
        ..PipelineConfig::default()
    };
    let t = create_test_pipeline_with(
        MockPhotoStore::new(),
        MockRecordStore::new(),
        MockNotifier::new().delay_sends(Duration::from_secs(10)),
        config,
    );

    let outcome = t
        .pipeline
        .submit(vec![person("Jane Doe", "X1")])
        .await
        .unwrap();

    assert_eq!(t.records.len(), 1);
    match outcome.notification {
        NotificationStatus::Failed(reason) => assert!(reason.contains("timed out")),
        NotificationStatus::Sent => panic!("notification should have timed out"),
    }
}
