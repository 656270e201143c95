//! Navigation, traversal and progress over task trees.
//!
//! Ancestry is read straight off the id: `root.2.1.3` lives at
//! `tasks["root.2"].subtasks["root.2.1"].subtasks["root.2.1.3"]`. Resolution
//! walks that path one segment at a time, so it works at any depth and never
//! needs to scan unrelated roots.
//!
//! # Progress
//!
//! [`TaskProgress`] counts every task in a subtree, completed or not.
//! Parents are counted like leaves; completing a parent does not complete
//! its children.
//!
//! # Consistency checks
//!
//! [`validate`] reports keys that could not have been produced by the id
//! scheme (malformed, non-canonical, or nested under the wrong parent) and
//! tasks whose `completed` flag disagrees with `completed_time`. Loading
//! never rejects such documents; the checks are advisory.

#![allow(clippy::module_name_repetitions)]

use serde::Serialize;
use std::fmt;

use crate::model::{Projects, Task, TaskId, TaskMap};

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Find the task with `id` inside a project's root map.
#[must_use]
pub fn resolve<'a>(tasks: &'a TaskMap, id: &TaskId) -> Option<&'a Task> {
    let mut level = tasks;
    let mut found = None;
    for step in id.lineage() {
        let task = level.get(&step.to_string())?;
        level = &task.subtasks;
        found = Some(task);
    }
    found
}

/// Mutable counterpart of [`resolve`].
pub fn resolve_mut<'a>(tasks: &'a mut TaskMap, id: &TaskId) -> Option<&'a mut Task> {
    descend_mut(tasks, &id.lineage())
}

fn descend_mut<'a>(tasks: &'a mut TaskMap, path: &[TaskId]) -> Option<&'a mut Task> {
    let (first, rest) = path.split_first()?;
    let task = tasks.get_mut(&first.to_string())?;
    if rest.is_empty() {
        Some(task)
    } else {
        descend_mut(&mut task.subtasks, rest)
    }
}

/// The map that holds (or would hold) `id`: the project's root map for a
/// root id, otherwise the parent's `subtasks`. `None` if the parent is missing.
pub fn container_mut<'a>(tasks: &'a mut TaskMap, id: &TaskId) -> Option<&'a mut TaskMap> {
    match id.parent() {
        None => Some(tasks),
        Some(parent) => resolve_mut(tasks, &parent).map(|task| &mut task.subtasks),
    }
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// One row of a pre-order walk.
#[derive(Debug, Clone, Copy)]
pub struct TreeEntry<'a> {
    /// Nesting level, 0 for root tasks.
    pub level: usize,
    pub id: &'a str,
    pub task: &'a Task,
}

/// Every task in display order: each task followed by its subtree.
#[must_use]
pub fn walk(tasks: &TaskMap) -> Vec<TreeEntry<'_>> {
    let mut out = Vec::new();
    push_level(tasks, 0, &mut out);
    out
}

fn push_level<'a>(tasks: &'a TaskMap, level: usize, out: &mut Vec<TreeEntry<'a>>) {
    for (id, task) in tasks.iter() {
        out.push(TreeEntry { level, id, task });
        push_level(&task.subtasks, level + 1, out);
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Completed vs total tasks in a subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskProgress {
    pub done: u32,
    pub total: u32,
}

impl TaskProgress {
    /// Tally every task in `tasks`, at any depth.
    #[must_use]
    pub fn of_tasks(tasks: &TaskMap) -> Self {
        tasks.values().fold(Self::default(), |acc, task| {
            let below = Self::of_tasks(&task.subtasks);
            Self {
                done: acc.done + u32::from(task.completed) + below.done,
                total: acc.total + 1 + below.total,
            }
        })
    }

    /// Percentage in `0.0..=100.0`; an empty subtree counts as complete.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent_complete(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        (self.done as f32 / self.total as f32) * 100.0
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.done == self.total
    }

    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.total.saturating_sub(self.done)
    }
}

impl fmt::Display for TaskProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({:.0}%)",
            self.done,
            self.total,
            self.percent_complete()
        )
    }
}

// ---------------------------------------------------------------------------
// Consistency checks
// ---------------------------------------------------------------------------

/// What is wrong with a task entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// The key is not a task id at all.
    MalformedId { reason: String },
    /// The key parses but is not in canonical form, so lookups miss it.
    NonCanonicalId { canonical: String },
    /// The key is not a direct child of the map that holds it.
    Misplaced { expected_parent: Option<String> },
    /// `completed` and `completed_time` disagree.
    CompletionMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeIssue {
    pub project: String,
    pub id: String,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl fmt::Display for TreeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: ", self.project, self.id)?;
        match &self.kind {
            IssueKind::MalformedId { reason } => write!(f, "malformed id ({reason})"),
            IssueKind::NonCanonicalId { canonical } => {
                write!(f, "non-canonical id, expected '{canonical}'")
            }
            IssueKind::Misplaced {
                expected_parent: Some(parent),
            } => write!(f, "not a direct child of '{parent}'"),
            IssueKind::Misplaced {
                expected_parent: None,
            } => write!(f, "nested id stored at the root level"),
            IssueKind::CompletionMismatch => {
                write!(f, "completed flag disagrees with completed_time")
            }
        }
    }
}

/// Check every project's tree.
#[must_use]
pub fn validate(projects: &Projects) -> Vec<TreeIssue> {
    let mut issues = Vec::new();
    for (project, body) in projects.iter() {
        check_level(project, &body.tasks, None, &mut issues);
    }
    issues
}

fn check_level(project: &str, tasks: &TaskMap, parent: Option<&str>, issues: &mut Vec<TreeIssue>) {
    let mut report = |id: &str, kind| {
        issues.push(TreeIssue {
            project: project.to_string(),
            id: id.to_string(),
            kind,
        });
    };

    for (key, task) in tasks.iter() {
        match TaskId::parse(key) {
            Err(err) => report(
                key,
                IssueKind::MalformedId {
                    reason: err.to_string(),
                },
            ),
            Ok(id) if id.to_string() != key => report(
                key,
                IssueKind::NonCanonicalId {
                    canonical: id.to_string(),
                },
            ),
            Ok(id) => {
                let actual_parent = id.parent().map(|p| p.to_string());
                if actual_parent.as_deref() != parent {
                    report(
                        key,
                        IssueKind::Misplaced {
                            expected_parent: parent.map(str::to_string),
                        },
                    );
                }
            }
        }

        if task.completed == task.completed_time.is_empty() {
            report(key, IssueKind::CompletionMismatch);
        }
    }

    for (key, task) in tasks.iter() {
        check_level(project, &task.subtasks, Some(key), issues);
    }
}
