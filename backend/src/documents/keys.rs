//! # Document Keys
//!
//! The editing server caches documents by key: the same key means "same
//! content, reuse what you have". A key therefore has to change whenever the
//! stored file changes.
//!
//! [`key_at`] is the pure fingerprint of a document version plus an explicit
//! freshness instant. [`generate_key`] composes it with the wall clock, so two
//! configurations served at different seconds carry different keys and the
//! editing server opens a fresh session each time.

use chrono::{DateTime, Local, TimeZone};
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Keys are truncated to this many hex characters.
pub const KEY_LEN: usize = 40;

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// The string that is hashed into a key.
fn key_source<Tz: TimeZone>(
    file_name: &str,
    id: &str,
    last_modified: &DateTime<Tz>,
    issued_at: &DateTime<Tz>,
    version: u32,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}_{}_{}_{}",
        id,
        last_modified.format(TIMESTAMP_FORMAT),
        issued_at.format(TIMESTAMP_FORMAT),
        version,
        file_name
    )
}

/// Key of a document version as issued at `issued_at`.
///
/// Deterministic: identical arguments always give the identical key.
pub fn key_at<Tz: TimeZone>(
    file_name: &str,
    id: &str,
    last_modified: &DateTime<Tz>,
    issued_at: &DateTime<Tz>,
    version: u32,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let source = key_source(file_name, id, last_modified, issued_at, version);
    let digest = Sha256::digest(source.as_bytes());
    let mut key = hex::encode(digest);
    key.truncate(KEY_LEN);
    key
}

/// Key of a document version issued now.
pub fn generate_key(
    file_name: &str,
    id: &str,
    last_modified: &DateTime<Local>,
    version: u32,
) -> String {
    key_at(file_name, id, last_modified, &Local::now(), version)
}

/// Key derived from the file name alone, used when a document has just been
/// created and has no content version yet.
pub fn generate_simple_key(file_name: &str) -> String {
    hex::encode(Sha1::digest(file_name.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn is_lower_hex(key: &str) -> bool {
        key.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }

    #[test]
    fn key_is_forty_lowercase_hex_chars() {
        let key = generate_key("report.docx", "abc", &Local::now(), 1);
        assert_eq!(key.len(), KEY_LEN);
        assert!(is_lower_hex(&key));
    }

    #[test]
    fn key_source_joins_fields_with_underscores() {
        let source = key_source(
            "a.docx",
            "id1",
            &at(2024, 3, 1, 8, 30, 0),
            &at(2024, 3, 2, 9, 0, 5),
            1,
        );
        assert_eq!(source, "id1_20240301083000_20240302090005_1_a.docx");
    }

    #[test]
    fn same_instant_gives_same_key() {
        let modified = at(2024, 3, 1, 8, 30, 0);
        let issued = at(2024, 3, 2, 9, 0, 5);
        assert_eq!(
            key_at("a.docx", "id1", &modified, &issued, 1),
            key_at("a.docx", "id1", &modified, &issued, 1)
        );
    }

    #[test]
    fn key_changes_with_freshness_and_version() {
        let modified = at(2024, 3, 1, 8, 30, 0);
        let first = key_at("a.docx", "id1", &modified, &at(2024, 3, 2, 9, 0, 5), 1);
        let later = key_at("a.docx", "id1", &modified, &at(2024, 3, 2, 9, 0, 6), 1);
        let bumped = key_at("a.docx", "id1", &modified, &at(2024, 3, 2, 9, 0, 5), 2);
        assert_ne!(first, later);
        assert_ne!(first, bumped);
    }

    #[test]
    fn simple_key_is_stable_sha1() {
        assert_eq!(generate_simple_key("x.docx"), generate_simple_key("x.docx"));
        // sha1("abc")
        assert_eq!(
            generate_simple_key("abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }
}
