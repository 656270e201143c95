//! Property: whatever the store holds, saving and loading reproduces it.

use proptest::prelude::*;
use tempfile::TempDir;
use twig_core::model::{Project, Projects, Task, TaskId, TaskMap};
use twig_core::storage;

fn arb_text() -> impl Strategy<Value = String> {
    // Mix ASCII, punctuation that needs escaping, and non-Latin scripts.
    prop::string::string_regex("[a-zA-Z0-9 \"\\\\/\n\t%家务买牛奶é]{0,16}").expect("valid regex")
}

fn arb_task() -> impl Strategy<Value = Task> {
    (arb_text(), arb_text(), any::<bool>(), arb_text()).prop_map(
        |(name, created_time, completed, note)| {
            let mut task = Task::new(name, created_time);
            task.note = note;
            if completed {
                task.mark_complete("2024-01-01 00:00:00");
            }
            task
        },
    )
}

/// Assign generated ids to a list of tasks nested up to three levels.
fn build_level(parent: Option<&TaskId>, nodes: Vec<(Task, Vec<(Task, Vec<Task>)>)>) -> TaskMap {
    let mut map = TaskMap::new();
    for (seq, (mut task, children)) in (1u32..).zip(nodes) {
        let id = parent.map_or_else(|| TaskId::root(seq), |p| p.child(seq));
        for (child_seq, (mut child, grandchildren)) in (1u32..).zip(children) {
            let child_id = id.child(child_seq);
            for (gc_seq, grandchild) in (1u32..).zip(grandchildren) {
                child
                    .subtasks
                    .insert(child_id.child(gc_seq).to_string(), grandchild);
            }
            task.subtasks.insert(child_id.to_string(), child);
        }
        map.insert(id.to_string(), task);
    }
    map
}

fn arb_project() -> impl Strategy<Value = Project> {
    prop::collection::vec(
        (
            arb_task(),
            prop::collection::vec((arb_task(), prop::collection::vec(arb_task(), 0..3)), 0..3),
        ),
        0..4,
    )
    .prop_map(|nodes| Project {
        tasks: build_level(None, nodes),
    })
}

fn arb_projects() -> impl Strategy<Value = Projects> {
    prop::collection::vec((arb_text(), arb_project()), 0..4)
        .prop_map(|entries| entries.into_iter().collect())
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn save_then_load_is_identity(projects in arb_projects()) {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("projects.json");
        storage::save(&path, &projects).expect("save");
        let loaded = storage::load(&path).expect("load");
        prop_assert_eq!(loaded, projects);
    }

    #[test]
    fn encoding_is_deterministic(projects in arb_projects()) {
        let first = storage::to_json_string(&projects).expect("encode");
        let reparsed = storage::from_json_str(&first).expect("decode");
        let second = storage::to_json_string(&reparsed).expect("re-encode");
        prop_assert_eq!(first, second);
    }
}
