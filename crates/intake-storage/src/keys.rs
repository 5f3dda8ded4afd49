//! Shared key generation for storage backends.
//!
//! Key format: `{epoch_millis}_{sanitized_name}.{ext}`, with `_{index}` appended
//! to the name of every person whose sanitized name collides with another person
//! of the same submission. All backends must use this format and the
//! `{storage_base}/{bucket}/{key}` URL shape for consistency.

use std::collections::HashMap;
use std::path::Path;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const FALLBACK_EXTENSION: &str = "bin";

/// What key derivation needs to know about one person's photo.
#[derive(Debug, Clone, Copy)]
pub struct PhotoKeyInput<'a> {
    pub full_name: &'a str,
    pub original_filename: &'a str,
    pub content_type: &'a str,
}

/// Strip diacritics and replace every character outside `[A-Za-z0-9_-]` with `_`.
///
/// "José Müller" becomes "Jose_Muller".
pub fn sanitize_name(full_name: &str) -> String {
    full_name
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File extension for a photo: the original filename's extension when it has a
/// usable one, else one derived from the declared MIME type, else `bin`.
pub fn extension_for(original_filename: &str, content_type: &str) -> String {
    let from_name = Path::new(original_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ext.to_lowercase()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
        })
        .filter(|ext| !ext.is_empty());

    if let Some(ext) = from_name {
        return ext;
    }

    extension_for_mime(content_type)
        .unwrap_or(FALLBACK_EXTENSION)
        .to_string()
}

fn extension_for_mime(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    match mime.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        "image/heif" => Some("heif"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Derive one key per person of a submission, in batch order.
///
/// All keys share `epoch_millis`, captured once per submission. Persons whose
/// sanitized names collide get their zero-based batch index appended; the
/// returned keys are pairwise distinct.
pub fn photo_keys(epoch_millis: i64, inputs: &[PhotoKeyInput<'_>]) -> Vec<String> {
    let mut stems: Vec<String> = inputs
        .iter()
        .map(|input| sanitize_name(input.full_name))
        .collect();
    let extensions: Vec<String> = inputs
        .iter()
        .map(|input| extension_for(input.original_filename, input.content_type))
        .collect();

    let mut stem_counts: HashMap<String, usize> = HashMap::new();
    for stem in &stems {
        *stem_counts.entry(stem.clone()).or_insert(0) += 1;
    }
    let shared: Vec<bool> = stems
        .iter()
        .map(|stem| stem_counts.get(stem).copied().unwrap_or(0) > 1)
        .collect();
    for (index, stem) in stems.iter_mut().enumerate() {
        if shared[index] {
            *stem = format!("{}_{}", stem, index);
        }
    }

    // A suffixed stem can collide with a later literal name ("Jane Doe 1"),
    // so repeat until every key is distinct. Each pass separates a group for good.
    for _ in 0..=inputs.len() {
        let keys = assemble(epoch_millis, &stems, &extensions);
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for key in &keys {
            *seen.entry(key.as_str()).or_insert(0) += 1;
        }
        let colliding: Vec<usize> = keys
            .iter()
            .enumerate()
            .filter(|(_, key)| seen.get(key.as_str()).copied().unwrap_or(0) > 1)
            .map(|(index, _)| index)
            .collect();

        if colliding.is_empty() {
            return keys;
        }
        for index in colliding {
            stems[index] = format!("{}_{}", stems[index], index);
        }
    }

    assemble(epoch_millis, &stems, &extensions)
}

fn assemble(epoch_millis: i64, stems: &[String], extensions: &[String]) -> Vec<String> {
    stems
        .iter()
        .zip(extensions)
        .map(|(stem, ext)| format!("{}_{}.{}", epoch_millis, stem, ext))
        .collect()
}

/// Public URL of a key: `{storage_base}/{bucket}/{key}`.
pub fn public_url(storage_base: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", storage_base.trim_end_matches('/'), bucket, key)
}

/// Strip exactly the `{storage_base}/{bucket}/` prefix from a public URL.
///
/// Returns `None` for URLs of another store, empty keys and keys that would
/// escape the bucket.
pub fn key_from_public_url(storage_base: &str, bucket: &str, url: &str) -> Option<String> {
    let prefix = format!("{}/{}/", storage_base.trim_end_matches('/'), bucket);
    let key = url.strip_prefix(&prefix)?;
    if key.is_empty() || key.contains("..") || key.starts_with('/') {
        return None;
    }
    Some(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(name: &'a str, file: &'a str) -> PhotoKeyInput<'a> {
        PhotoKeyInput {
            full_name: name,
            original_filename: file,
            content_type: "image/jpeg",
        }
    }

    #[test]
    fn sanitize_strips_diacritics_and_symbols() {
        assert_eq!(sanitize_name("José Müller"), "Jose_Muller");
        assert_eq!(sanitize_name("Jane Doe"), "Jane_Doe");
        assert_eq!(sanitize_name("O'Brien-Smith"), "O_Brien-Smith");
        assert_eq!(sanitize_name("a/b\\c..d"), "a_b_c__d");
    }

    #[test]
    fn extension_prefers_filename_then_mime() {
        assert_eq!(extension_for("photo.JPG", "image/png"), "jpg");
        assert_eq!(extension_for("photo", "image/png"), "png");
        assert_eq!(extension_for("photo", "image/jpeg; charset=binary"), "jpg");
        assert_eq!(extension_for("photo.", "application/x-unknown"), "bin");
        assert_eq!(extension_for("", ""), "bin");
    }

    #[test]
    fn unique_names_get_plain_keys() {
        let keys = photo_keys(
            1700000000000,
            &[input("Jane Doe", "a.jpg"), input("John Roe", "b.png")],
        );
        assert_eq!(
            keys,
            vec![
                "1700000000000_Jane_Doe.jpg".to_string(),
                "1700000000000_John_Roe.png".to_string(),
            ]
        );
    }

    #[test]
    fn duplicate_names_get_distinct_keys() {
        let keys = photo_keys(
            42,
            &[
                input("Jane Doe", "a.jpg"),
                input("John Roe", "b.jpg"),
                input("Jane Doe", "c.jpg"),
            ],
        );
        assert_eq!(keys[0], "42_Jane_Doe_0.jpg");
        assert_eq!(keys[1], "42_John_Roe.jpg");
        assert_eq!(keys[2], "42_Jane_Doe_2.jpg");
    }

    #[test]
    fn names_equal_after_sanitizing_collide() {
        let keys = photo_keys(42, &[input("Zoë", "a.jpg"), input("Zoe", "b.jpg")]);
        assert_eq!(keys, vec!["42_Zoe_0.jpg".to_string(), "42_Zoe_1.jpg".to_string()]);
    }

    #[test]
    fn shared_name_is_suffixed_even_when_extensions_differ() {
        let keys = photo_keys(42, &[input("Jane Doe", "a.jpg"), input("Jane Doe", "b.png")]);
        assert_eq!(
            keys,
            vec!["42_Jane_Doe_0.jpg".to_string(), "42_Jane_Doe_1.png".to_string()]
        );
    }

    #[test]
    fn suffix_clash_with_literal_name_is_resolved() {
        let keys = photo_keys(
            7,
            &[
                input("Jane Doe", "a.jpg"),
                input("Jane Doe", "b.jpg"),
                input("Jane Doe 1", "c.jpg"),
            ],
        );
        let mut unique = keys.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 3, "keys: {:?}", keys);
    }

    #[test]
    fn url_round_trip_strips_exact_prefix() {
        let url = public_url("http://localhost:9000/", "passport-photos", "1_Jane_Doe.jpg");
        assert_eq!(url, "http://localhost:9000/passport-photos/1_Jane_Doe.jpg");
        assert_eq!(
            key_from_public_url("http://localhost:9000", "passport-photos", &url).as_deref(),
            Some("1_Jane_Doe.jpg")
        );
    }

    #[test]
    fn foreign_or_malformed_urls_yield_no_key() {
        let base = "http://localhost:9000";
        assert_eq!(key_from_public_url(base, "passport-photos", "not a url"), None);
        assert_eq!(
            key_from_public_url(base, "passport-photos", "http://localhost:9000/other/1.jpg"),
            None
        );
        assert_eq!(
            key_from_public_url(base, "passport-photos", "http://localhost:9000/passport-photos/"),
            None
        );
        assert_eq!(
            key_from_public_url(
                base,
                "passport-photos",
                "http://localhost:9000/passport-photos/../secret"
            ),
            None
        );
    }
}
