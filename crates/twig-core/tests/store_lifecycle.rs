//! End-to-end store lifecycle against a real file.
//!
//! Every step reopens the store from disk, the way each CLI invocation does,
//! so these tests cover persistence as well as the in-memory operations.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use twig_core::clock::parse_timestamp;
use twig_core::error::{NotFoundError, ValidationError};
use twig_core::{Store, TwigError};

fn store_path(dir: &TempDir) -> PathBuf {
    dir.path().join("projects.json")
}

fn reopen(path: &Path) -> Store {
    Store::open(path).expect("open store")
}

#[test]
fn milk_scenario() {
    let dir = TempDir::new().expect("tempdir");
    let path = store_path(&dir);

    assert!(reopen(&path).projects().is_empty());

    reopen(&path).add_project("P").expect("add project");
    let store = reopen(&path);
    assert_eq!(store.project_names().collect::<Vec<_>>(), ["P"]);
    assert!(store.tasks("P").expect("tasks").is_empty());

    let root = reopen(&path).add_root_task("P", "Buy milk").expect("root task");
    assert_eq!(root.to_string(), "root.1");
    assert!(!reopen(&path).task("P", "root.1").expect("lookup").completed);

    let child = reopen(&path)
        .add_subtask("P", "root.1", "2% milk")
        .expect("subtask");
    assert_eq!(child.to_string(), "root.1.1");

    reopen(&path).complete("P", "root.1.1").expect("complete");
    let store = reopen(&path);
    let task = store.task("P", "root.1.1").expect("lookup");
    assert!(task.completed);
    assert!(parse_timestamp(&task.completed_time).is_some());

    reopen(&path).delete_project("P").expect("delete project");
    assert!(reopen(&path).projects().is_empty());
}

#[test]
fn deleting_a_task_drops_its_subtree_on_disk() {
    let dir = TempDir::new().expect("tempdir");
    let path = store_path(&dir);
    let mut store = reopen(&path);
    store.add_project("P").expect("project");
    store.add_root_task("P", "a").expect("a");
    store.add_subtask("P", "root.1", "a.1").expect("a.1");
    store.add_subtask("P", "root.1.1", "a.1.1").expect("a.1.1");
    store.add_root_task("P", "b").expect("b");

    store.delete_task("P", "root.1").expect("delete");

    let store = reopen(&path);
    let ids: Vec<&str> = store
        .walk("P")
        .expect("walk")
        .iter()
        .map(|entry| entry.id)
        .collect();
    assert_eq!(ids, ["root.2"]);
}

#[test]
fn missing_references_are_reported_not_panicked() {
    let dir = TempDir::new().expect("tempdir");
    let path = store_path(&dir);
    let mut store = reopen(&path);
    store.add_project("P").expect("project");

    assert!(matches!(
        store.delete_project("Q"),
        Err(TwigError::NotFound(NotFoundError::Project { .. }))
    ));
    assert!(matches!(
        store.complete("P", "root.1"),
        Err(TwigError::NotFound(NotFoundError::Task { .. }))
    ));
    assert!(matches!(
        store.set_note("Q", "root.1", "x"),
        Err(TwigError::NotFound(NotFoundError::Project { .. }))
    ));
    assert!(matches!(
        store.uncomplete("P", "root"),
        Err(TwigError::Validation(ValidationError::InvalidTaskId(_)))
    ));
}

#[test]
fn rename_is_visible_after_reopen() {
    let dir = TempDir::new().expect("tempdir");
    let path = store_path(&dir);
    let mut store = reopen(&path);
    store.add_project("Old").expect("project");
    store.add_root_task("Old", "carry over").expect("task");
    store.rename_project("Old", "New").expect("rename");

    let store = reopen(&path);
    assert!(store.project("Old").is_err());
    assert_eq!(store.task("New", "root.1").expect("task").name, "carry over");
}
