use serde::{Deserialize, Serialize};

use super::map::OrderedMap;
use super::task_id::TaskId;
use crate::error::ValidationError;

/// Child tasks keyed by their dotted id, in creation order.
pub type TaskMap = OrderedMap<Task>;

/// One node of a project's task tree, in its on-disk shape.
///
/// Only `name` is required when reading; the other fields fall back to
/// empty values so hand-edited or older files still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    #[serde(default)]
    pub created_time: String,
    #[serde(default)]
    pub completed: bool,
    /// Empty while the task is open.
    #[serde(default)]
    pub completed_time: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub subtasks: TaskMap,
}

impl Task {
    /// A fresh, open task with no note and no children.
    #[must_use]
    pub fn new(name: impl Into<String>, created_time: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_time: created_time.into(),
            completed: false,
            completed_time: String::new(),
            note: String::new(),
            subtasks: TaskMap::new(),
        }
    }

    pub fn mark_complete(&mut self, at: impl Into<String>) {
        self.completed = true;
        self.completed_time = at.into();
    }

    pub fn mark_incomplete(&mut self) {
        self.completed = false;
        self.completed_time.clear();
    }

    /// Number of tasks below this one, at any depth.
    #[must_use]
    pub fn descendant_count(&self) -> usize {
        self.subtasks
            .values()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }
}

/// Sequence number for the next entry of `tasks`.
///
/// One past the largest sequence number already present, so a new id never
/// lands on a live sibling even after deletions. Keys that do not parse as
/// task ids are ignored. `None` once the largest sibling is `u32::MAX`.
#[must_use]
pub fn next_seq(tasks: &TaskMap) -> Option<u32> {
    tasks
        .keys()
        .filter_map(|key| TaskId::parse(key).ok())
        .map(|id| id.seq())
        .max()
        .unwrap_or(0)
        .checked_add(1)
}

/// Allocate the id for a new entry in `tasks`, placed under `parent`
/// (or at the root when `parent` is `None`).
///
/// # Errors
///
/// Returns [`ValidationError::SequenceExhausted`] when no sequence number is
/// left after the largest sibling.
pub fn allocate_id(
    tasks: &TaskMap,
    parent: Option<&TaskId>,
) -> Result<TaskId, ValidationError> {
    let seq = next_seq(tasks).ok_or_else(|| ValidationError::SequenceExhausted {
        parent: parent.map_or_else(|| "root".to_string(), ToString::to_string),
    })?;
    Ok(parent.map_or_else(|| TaskId::root(seq), |p| p.child(seq)))
}
