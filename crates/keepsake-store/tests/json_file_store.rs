#![forbid(unsafe_code)]

//! File-backed store behaviour.
//!
//! # Invariants
//!
//! 1. Every call re-reads the document; edits are visible on the next fetch.
//! 2. A missing file or malformed JSON is a fetch failure, never a panic.
//! 3. A document without `settings/config.unlockTime` is `ConfigMissing`.
//! 4. Reason limits take the first N in document order.

use std::fs;

use chrono::{TimeZone, Utc};
use keepsake_store::{
    ConfigStore, ContentKind, ContentStore, FetchError, JsonFileStore, MediaStore, PHOTOS_FOLDER,
    require_non_empty,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(dir: &TempDir, body: &str) -> JsonFileStore {
    let path = dir.path().join("keepsake.json");
    fs::write(&path, body).unwrap();
    JsonFileStore::new(path)
}

#[test]
fn reads_unlock_time_with_offset() {
    let dir = TempDir::new().unwrap();
    let store = write(
        &dir,
        r#"{"settings":{"config":{"unlockTime":"2025-11-20T00:00:00+05:30"}}}"#,
    );
    assert_eq!(
        store.get().unwrap().target,
        Utc.with_ymd_and_hms(2025, 11, 19, 18, 30, 0).unwrap()
    );
}

#[test]
fn missing_file_is_fetch_failure() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("absent.json"));
    assert!(matches!(store.get(), Err(FetchError::FetchFailure(_))));
    assert!(matches!(
        store.list(ContentKind::Reasons, None),
        Err(FetchError::FetchFailure(_))
    ));
}

#[test]
fn malformed_file_is_fetch_failure() {
    let dir = TempDir::new().unwrap();
    let store = write(&dir, "settings: nope");
    assert!(matches!(store.get(), Err(FetchError::FetchFailure(_))));
}

#[test]
fn document_without_config_is_config_missing() {
    let dir = TempDir::new().unwrap();
    let store = write(&dir, r#"{"reasons":[]}"#);
    assert_eq!(store.get(), Err(FetchError::ConfigMissing));
}

#[test]
fn edits_are_visible_on_next_fetch() {
    let dir = TempDir::new().unwrap();
    let store = write(&dir, r#"{"reasons":[]}"#);
    let first = store.list(ContentKind::Reasons, None).unwrap();
    assert_eq!(require_non_empty(first), Err(FetchError::EmptyContent));

    fs::write(
        store.path(),
        r#"{"reasons":[{"id":"a","text":"one"},{"id":"b","text":"two"},{"id":"c","text":"three"}]}"#,
    )
    .unwrap();
    let capped = store.list(ContentKind::Reasons, Some(2)).unwrap();
    let ids: Vec<&str> = capped.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn photos_folder_lists_urls() {
    let dir = TempDir::new().unwrap();
    let store = write(&dir, r#"{"media":{"photos":["https://x/a.jpg"]}}"#);
    let photos = store.list_media(PHOTOS_FOLDER).unwrap();
    assert_eq!(photos.len(), 1);
    assert_eq!(photos[0].url(), Some("https://x/a.jpg"));
}
