//! Multipart form decoding for submissions.
//!
//! Persons are sent as indexed fields: `persons[{i}][full_name]`, ...,
//! `persons[{i}][photo]` (file part). Indices must start at 0 and be contiguous.

use std::collections::BTreeMap;

use axum::extract::Multipart;
use intake_core::constants::MAX_PERSONS_PER_SUBMISSION;
use intake_core::models::{PersonInput, PhotoUpload};
use intake_core::AppError;

/// Highest index accepted before the batch-size check runs, so a hostile form
/// cannot make the server allocate arbitrarily many persons.
const MAX_FORM_INDEX: usize = MAX_PERSONS_PER_SUBMISSION * 4;

/// Split `persons[3][full_name]` into `(3, "full_name")`.
pub fn parse_field_name(name: &str) -> Option<(usize, &str)> {
    let rest = name.strip_prefix("persons[")?;
    let (index, rest) = rest.split_once(']')?;
    let field = rest.strip_prefix('[')?.strip_suffix(']')?;
    if field.is_empty() || field.contains(['[', ']']) {
        return None;
    }
    let index = index.parse::<usize>().ok()?;
    Some((index, field))
}

/// Read every part of the form into persons, in index order.
pub async fn extract_persons(mut multipart: Multipart) -> Result<Vec<PersonInput>, AppError> {
    let mut persons: BTreeMap<usize, PersonInput> = BTreeMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();
        let Some((index, key)) = parse_field_name(&name) else {
            tracing::debug!(field = %name, "Ignoring unrecognized form field");
            continue;
        };

        if index >= MAX_FORM_INDEX {
            return Err(AppError::InvalidInput(format!(
                "Person index {} is out of range",
                index
            )));
        }

        let person = persons.entry(index).or_default();

        if key == "photo" {
            if person.photo.is_some() {
                return Err(AppError::InvalidInput(format!(
                    "Multiple photos sent for person {}",
                    index + 1
                )));
            }
            let filename = field.file_name().map(|s| s.to_string()).unwrap_or_default();
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read photo data: {}", e)))?;

            // Browsers send an empty, unnamed part for a file input left blank.
            if filename.is_empty() && data.is_empty() {
                continue;
            }
            person.photo = Some(PhotoUpload::new(filename, content_type, data.to_vec()));
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read field {}: {}", name, e)))?;
        set_text_field(person, key, value);
    }

    for (expected, index) in persons.keys().enumerate() {
        if *index != expected {
            return Err(AppError::InvalidInput(format!(
                "Person indexes must be contiguous from 0; missing person {}",
                expected
            )));
        }
    }

    Ok(persons.into_values().collect())
}

fn set_text_field(person: &mut PersonInput, key: &str, value: String) {
    match key {
        "full_name" => person.full_name = value,
        "passport_number" => person.passport_number = value,
        "date_of_birth" => person.date_of_birth = value,
        "expiry_date" => person.expiry_date = value,
        "country" => person.country = Some(value),
        "email" => person.email = Some(value),
        "address" => person.address = Some(value),
        "phone_number" => person.phone_number = Some(value),
        other => tracing::debug!(field = other, "Ignoring unknown person field"),
    }
}
