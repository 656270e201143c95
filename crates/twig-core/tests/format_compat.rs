//! Compatibility with store files written by earlier releases and by hand.
//!
//! `tests/fixtures/legacy_projects.json` mirrors what the original desktop
//! tool produced: 4-space indentation, `root.<n>` ids whose order is not
//! lexical, a root task without a `subtasks` key, and a project whose first
//! root task was deleted (so ids start at `root.2`).

use std::path::PathBuf;

use tempfile::TempDir;
use twig_core::model::Projects;
use twig_core::storage::{self, StorageError};
use twig_core::{Store, TwigError};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/legacy_projects.json")
}

/// Copy the fixture into a temp dir so tests can write to it.
fn fixture_store(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("projects.json");
    std::fs::copy(fixture_path(), &path).expect("copy fixture");
    path
}

#[test]
fn legacy_file_loads_with_order_preserved() {
    let projects = storage::load(&fixture_path()).expect("load fixture");
    assert_eq!(
        projects.keys().collect::<Vec<_>>(),
        ["家务", "Release 1.0", "Empty"]
    );

    let release = projects.get("Release 1.0").expect("release project");
    assert_eq!(release.tasks.keys().collect::<Vec<_>>(), ["root.2", "root.10"]);

    let chores = projects.get("家务").expect("chores project");
    let milk = chores.tasks.get("root.1").expect("root.1");
    assert!(milk.completed);
    assert_eq!(milk.completed_time, "2024-11-02 18:01:07");
    assert_eq!(milk.subtasks.len(), 1);

    let plants = chores.tasks.get("root.2").expect("root.2");
    assert!(plants.subtasks.is_empty());
}

#[test]
fn ascii_escaped_names_decode() {
    // The original writer escaped every non-ASCII character.
    let json = r#"{"\u5bb6\u52a1": {"tasks": {"root.1": {"name": "\u4e70\u725b\u5976"}}}}"#;
    let projects: Projects = storage::from_json_str(json).expect("parse");
    let project = projects.get("家务").expect("decoded project key");
    assert_eq!(project.tasks.get("root.1").map(|t| t.name.as_str()), Some("买牛奶"));
}

#[test]
fn legacy_file_round_trips_unchanged() {
    let original = storage::load(&fixture_path()).expect("load fixture");
    let encoded = storage::to_json_string(&original).expect("encode");
    let decoded = storage::from_json_str(&encoded).expect("decode");
    assert_eq!(decoded, original);
}

#[test]
fn saving_fills_in_missing_subtasks_key() {
    let dir = TempDir::new().expect("tempdir");
    let path = fixture_store(&dir);
    let mut store = Store::open(&path).expect("open");
    store.set_note("家务", "root.2", "twice a week").expect("note");

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
    let plants = &raw["家务"]["tasks"]["root.2"];
    assert_eq!(plants["note"], "twice a week");
    assert!(plants["subtasks"].as_object().is_some_and(serde_json::Map::is_empty));
}

#[test]
fn new_root_ids_continue_after_highest_existing() {
    let dir = TempDir::new().expect("tempdir");
    let path = fixture_store(&dir);
    let mut store = Store::open(&path).expect("open");

    // Two root tasks exist (root.2, root.10); a count-based id would be root.3,
    // highest-plus-one is root.11.
    let id = store.add_root_task("Release 1.0", "Announce").expect("add");
    assert_eq!(id.to_string(), "root.11");

    let child = store
        .add_subtask("Release 1.0", "root.2", "Write summary")
        .expect("add child");
    assert_eq!(child.to_string(), "root.2.2");
}

#[test]
fn legacy_file_passes_consistency_check() {
    let store = Store::open(fixture_path()).expect("open");
    assert!(store.validate().is_empty(), "{:?}", store.validate());
}

#[test]
fn truncated_file_reports_malformed_store() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("projects.json");
    let full = std::fs::read_to_string(fixture_path()).expect("read fixture");
    let cut = full.find("\"Release").expect("second project");
    std::fs::write(&path, &full[..cut]).expect("write truncated");

    let err = Store::open(&path).expect_err("truncated file");
    assert!(matches!(
        err,
        TwigError::Storage(StorageError::Malformed { .. })
    ));
    assert_eq!(err.error_code().code(), "E5003");
}
