//! Person and record fixtures.

use intake_core::models::{PersonInput, PhotoUpload, SubmissionRecord};

/// A JPEG-looking payload of `size` bytes.
pub fn jpeg_bytes(size: usize) -> Vec<u8> {
    let mut data = vec![0u8; size];
    let magic = [0xFF, 0xD8, 0xFF, 0xE0];
    let n = magic.len().min(size);
    data[..n].copy_from_slice(&magic[..n]);
    data
}

/// A valid person with a small JPEG photo.
pub fn person(full_name: &str, passport_number: &str) -> PersonInput {
    person_with_photo(full_name, passport_number, 1024)
}

/// A valid person with a JPEG photo of `photo_size` bytes.
pub fn person_with_photo(full_name: &str, passport_number: &str, photo_size: usize) -> PersonInput {
    PersonInput {
        full_name: full_name.to_string(),
        passport_number: passport_number.to_string(),
        date_of_birth: "1990-01-01".to_string(),
        expiry_date: "2030-01-01".to_string(),
        country: Some("Belgium".to_string()),
        email: Some("jane@example.com".to_string()),
        address: None,
        phone_number: None,
        photo: Some(PhotoUpload::new(
            "passport.jpg",
            "image/jpeg",
            jpeg_bytes(photo_size),
        )),
    }
}

/// A record whose photo lives in the mock store under `key`.
pub fn record_with_key(full_name: &str, key: &str) -> SubmissionRecord {
    SubmissionRecord {
        full_name: full_name.to_string(),
        passport_number: "X1".to_string(),
        date_of_birth: "1990-01-01".to_string(),
        expiry_date: "2030-01-01".to_string(),
        country: None,
        email: None,
        address: None,
        phone_number: None,
        photo_url: format!(
            "{}/{}/{}",
            super::MOCK_STORAGE_BASE,
            super::MOCK_BUCKET,
            key
        ),
    }
}
