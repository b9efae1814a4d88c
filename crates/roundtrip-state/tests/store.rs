//! Tests for the on-disk state format.

use std::fs;

use roundtrip_state::{SaveOutcome, StateStore};

#[test]
fn state_file_uses_documented_schema() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = StateStore::new(dir.path());
    store.save("translation", "9f8e7d");

    let raw = fs::read_to_string(store.path_for("translation")).expect("read state");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("parse state");
    assert_eq!(json["lastProcessedRevision"], "9f8e7d");
    let timestamp = json["timestamp"].as_str().expect("timestamp string");
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[test]
fn new_revision_replaces_old_one() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = StateStore::new(dir.path());
    assert_eq!(store.save("edition", "rev-1"), SaveOutcome::Written);
    assert_eq!(store.save("edition", "rev-2"), SaveOutcome::Written);
    let state = store.load("edition").expect("state present");
    assert_eq!(state.last_processed_revision, "rev-2");
}

#[test]
fn unwritable_directory_is_not_fatal() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "a file, not a directory").expect("write blocker");
    let store = StateStore::new(blocker.join("state"));
    assert_eq!(store.save("edition", "rev-1"), SaveOutcome::Failed);
}
