//! The project store: owner of the in-memory collection and the only way to
//! change it.
//!
//! Every mutating operation follows the same shape: validate, mutate the
//! tree, persist according to the [`WritePolicy`], and hand back a
//! [`TwigError`] the presentation layer can show. Validation and lookup
//! failures leave the collection untouched. A storage failure happens after
//! the in-memory change, so the store stays dirty and a later
//! [`Store::commit`] can retry the write.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::clock::{Clock, SystemClock};
use crate::error::{NotFoundError, TwigError, ValidationError};
use crate::model::task::allocate_id;
use crate::model::{Project, Projects, Task, TaskId, TaskMap};
use crate::storage;
use crate::tree::{self, TaskProgress, TreeEntry, TreeIssue};

/// When mutations reach the disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritePolicy {
    /// Rewrite the file after every mutation.
    #[default]
    Immediate,
    /// Only write on [`Store::commit`].
    Deferred,
}

impl WritePolicy {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Deferred => "deferred",
        }
    }
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "immediate" => Ok(Self::Immediate),
            "deferred" => Ok(Self::Deferred),
            other => Err(format!(
                "invalid write policy '{other}': expected immediate or deferred"
            )),
        }
    }
}

/// Owns the project collection backed by one JSON file.
#[derive(Debug)]
pub struct Store<C = SystemClock> {
    path: PathBuf,
    projects: Projects,
    policy: WritePolicy,
    dirty: bool,
    clock: C,
}

impl Store<SystemClock> {
    /// Load the store at `path` with immediate writes and the system clock.
    ///
    /// # Errors
    ///
    /// Propagates [`storage::load`] failures.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TwigError> {
        Self::open_with(path, WritePolicy::Immediate, SystemClock)
    }
}

impl<C: Clock> Store<C> {
    /// Load the store at `path` with an explicit policy and clock.
    ///
    /// # Errors
    ///
    /// Propagates [`storage::load`] failures.
    pub fn open_with(
        path: impl Into<PathBuf>,
        policy: WritePolicy,
        clock: C,
    ) -> Result<Self, TwigError> {
        let path = path.into();
        let projects = storage::load(&path)?;
        Ok(Self::from_projects(path, projects, policy, clock))
    }

    /// Wrap an already-loaded collection without touching the disk.
    #[must_use]
    pub const fn from_projects(
        path: PathBuf,
        projects: Projects,
        policy: WritePolicy,
        clock: C,
    ) -> Self {
        Self {
            path,
            projects,
            policy,
            dirty: false,
            clock,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn policy(&self) -> WritePolicy {
        self.policy
    }

    /// Change the policy. Switching to immediate does not flush; call
    /// [`Store::commit`] for that.
    pub const fn set_policy(&mut self, policy: WritePolicy) {
        self.policy = policy;
    }

    /// True when in-memory changes have not been written yet.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the whole collection if anything changed since the last write.
    ///
    /// # Errors
    ///
    /// Propagates [`storage::save`] failures; the store stays dirty.
    pub fn commit(&mut self) -> Result<(), TwigError> {
        if !self.dirty {
            return Ok(());
        }
        storage::save(&self.path, &self.projects)?;
        self.dirty = false;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub const fn projects(&self) -> &Projects {
        &self.projects
    }

    pub fn project_names(&self) -> impl Iterator<Item = &str> {
        self.projects.keys()
    }

    /// Look up a project. Surrounding whitespace in `name` is ignored, the
    /// same way [`Store::add_project`] trims it.
    ///
    /// # Errors
    ///
    /// `NoProjectSelected` for a blank name, `NotFound` if absent.
    pub fn project(&self, name: &str) -> Result<&Project, TwigError> {
        let name = selected(name)?;
        self.projects.get(name).ok_or_else(|| project_not_found(name))
    }

    /// Root tasks of `project`.
    ///
    /// # Errors
    ///
    /// Same as [`Store::project`].
    pub fn tasks(&self, project: &str) -> Result<&TaskMap, TwigError> {
        Ok(&self.project(project)?.tasks)
    }

    /// # Errors
    ///
    /// Project lookup errors, `InvalidTaskId`, or `NotFound` for the task.
    pub fn task(&self, project: &str, task_id: &str) -> Result<&Task, TwigError> {
        let id = TaskId::parse(task_id)?;
        tree::resolve(self.tasks(project)?, &id).ok_or_else(|| task_not_found(project, &id))
    }

    /// All tasks of `project` in display order.
    ///
    /// # Errors
    ///
    /// Same as [`Store::project`].
    pub fn walk(&self, project: &str) -> Result<Vec<TreeEntry<'_>>, TwigError> {
        Ok(tree::walk(self.tasks(project)?))
    }

    /// # Errors
    ///
    /// Same as [`Store::project`].
    pub fn progress(&self, project: &str) -> Result<TaskProgress, TwigError> {
        Ok(TaskProgress::of_tasks(self.tasks(project)?))
    }

    /// Advisory consistency report over every project.
    #[must_use]
    pub fn validate(&self) -> Vec<TreeIssue> {
        tree::validate(&self.projects)
    }

    // -----------------------------------------------------------------------
    // Project operations
    // -----------------------------------------------------------------------

    /// Create an empty project and return its (trimmed) name.
    ///
    /// # Errors
    ///
    /// `EmptyName`, `DuplicateProject`, or a storage failure.
    pub fn add_project(&mut self, name: &str) -> Result<String, TwigError> {
        let name = non_empty(name, "project")?;
        if self.projects.contains_key(&name) {
            return Err(ValidationError::DuplicateProject { name }.into());
        }
        self.projects.insert(name.clone(), Project::new());
        tracing::info!(project = %name, "project added");
        self.mutated()?;
        Ok(name)
    }

    /// Re-key `old` as `new`. The project moves to the end of the ordering.
    ///
    /// # Errors
    ///
    /// `NoProjectSelected` or `NotFound` for `old`, `EmptyName` or
    /// `DuplicateProject` for `new` (renaming to the same name counts as a
    /// duplicate), or a storage failure.
    pub fn rename_project(&mut self, old: &str, new: &str) -> Result<String, TwigError> {
        let old = selected(old)?;
        if !self.projects.contains_key(old) {
            return Err(project_not_found(old));
        }
        let new = non_empty(new, "project")?;
        if self.projects.contains_key(&new) {
            return Err(ValidationError::DuplicateProject { name: new }.into());
        }
        let project = self
            .projects
            .remove(old)
            .ok_or_else(|| project_not_found(old))?;
        self.projects.insert(new.clone(), project);
        tracing::info!(from = old, to = %new, "project renamed");
        self.mutated()?;
        Ok(new)
    }

    /// Remove a project and everything in it, returning what was removed.
    ///
    /// # Errors
    ///
    /// `NoProjectSelected`, `NotFound`, or a storage failure.
    pub fn delete_project(&mut self, name: &str) -> Result<Project, TwigError> {
        let name = selected(name)?;
        let removed = self
            .projects
            .remove(name)
            .ok_or_else(|| project_not_found(name))?;
        tracing::info!(project = name, tasks = removed.task_count(), "project deleted");
        self.mutated()?;
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Task operations
    // -----------------------------------------------------------------------

    /// Add a root task and return its id (`root.<n>`).
    ///
    /// # Errors
    ///
    /// `NoProjectSelected`, `NotFound`, `EmptyName`, `SequenceExhausted`, or a
    /// storage failure.
    pub fn add_root_task(&mut self, project: &str, name: &str) -> Result<TaskId, TwigError> {
        let now = self.clock.timestamp();
        let tasks = self.tasks_mut(project)?;
        let name = non_empty(name, "task")?;
        let id = allocate_id(tasks, None)?;
        tasks.insert(id.to_string(), Task::new(name, now));
        tracing::info!(project, task = %id, "root task added");
        self.mutated()?;
        Ok(id)
    }

    /// Add a child under `parent_id` and return its id (`<parent_id>.<m>`).
    ///
    /// # Errors
    ///
    /// Project lookup errors, `InvalidTaskId`, `NotFound` for the parent,
    /// `EmptyName`, `SequenceExhausted`, or a storage failure.
    pub fn add_subtask(
        &mut self,
        project: &str,
        parent_id: &str,
        name: &str,
    ) -> Result<TaskId, TwigError> {
        let now = self.clock.timestamp();
        let parent = self.task_mut(project, parent_id)?;
        let name = non_empty(name, "task")?;
        let parent_key = TaskId::parse(parent_id)?;
        let id = allocate_id(&parent.subtasks, Some(&parent_key))?;
        parent.subtasks.insert(id.to_string(), Task::new(name, now));
        tracing::info!(project, parent = %parent_key, task = %id, "subtask added");
        self.mutated()?;
        Ok(id)
    }

    /// # Errors
    ///
    /// Lookup errors, `EmptyName`, or a storage failure.
    pub fn rename_task(
        &mut self,
        project: &str,
        task_id: &str,
        new_name: &str,
    ) -> Result<(), TwigError> {
        let task = self.task_mut(project, task_id)?;
        task.name = non_empty(new_name, "task")?;
        tracing::info!(project, task = task_id, "task renamed");
        self.mutated()
    }

    /// Replace the note. Empty notes are allowed.
    ///
    /// # Errors
    ///
    /// Lookup errors or a storage failure.
    pub fn set_note(&mut self, project: &str, task_id: &str, note: &str) -> Result<(), TwigError> {
        let task = self.task_mut(project, task_id)?;
        note.clone_into(&mut task.note);
        tracing::debug!(project, task = task_id, len = note.len(), "note updated");
        self.mutated()
    }

    /// Mark done and stamp `completed_time`; returns the stamp.
    ///
    /// Completing an already-completed task refreshes the stamp.
    ///
    /// # Errors
    ///
    /// Lookup errors or a storage failure.
    pub fn complete(&mut self, project: &str, task_id: &str) -> Result<String, TwigError> {
        let now = self.clock.timestamp();
        self.task_mut(project, task_id)?.mark_complete(now.clone());
        tracing::info!(project, task = task_id, at = %now, "task completed");
        self.mutated()?;
        Ok(now)
    }

    /// Mark not done and clear `completed_time`.
    ///
    /// # Errors
    ///
    /// Lookup errors or a storage failure.
    pub fn uncomplete(&mut self, project: &str, task_id: &str) -> Result<(), TwigError> {
        self.task_mut(project, task_id)?.mark_incomplete();
        tracing::info!(project, task = task_id, "task reopened");
        self.mutated()
    }

    /// Remove a task together with its subtree. Siblings keep their ids.
    ///
    /// # Errors
    ///
    /// Lookup errors or a storage failure.
    pub fn delete_task(&mut self, project: &str, task_id: &str) -> Result<Task, TwigError> {
        let id = TaskId::parse(task_id)?;
        let key = id.to_string();
        let tasks = self.tasks_mut(project)?;
        let removed = tree::container_mut(tasks, &id)
            .and_then(|siblings| siblings.remove(&key))
            .ok_or_else(|| task_not_found(project, &id))?;
        tracing::info!(
            project,
            task = %id,
            descendants = removed.descendant_count(),
            "task deleted"
        );
        self.mutated()?;
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn tasks_mut(&mut self, project: &str) -> Result<&mut TaskMap, TwigError> {
        let project = selected(project)?;
        self.projects
            .get_mut(project)
            .map(|p| &mut p.tasks)
            .ok_or_else(|| project_not_found(project))
    }

    fn task_mut(&mut self, project: &str, task_id: &str) -> Result<&mut Task, TwigError> {
        let id = TaskId::parse(task_id)?;
        let tasks = self.tasks_mut(project)?;
        tree::resolve_mut(tasks, &id).ok_or_else(|| task_not_found(project, &id))
    }

    fn mutated(&mut self) -> Result<(), TwigError> {
        self.dirty = true;
        match self.policy {
            WritePolicy::Immediate => self.commit(),
            WritePolicy::Deferred => Ok(()),
        }
    }
}

fn non_empty(raw: &str, what: &'static str) -> Result<String, TwigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName { what }.into());
    }
    Ok(trimmed.to_string())
}

/// Trimmed project name for a lookup. Blank means nothing was selected.
fn selected(name: &str) -> Result<&str, TwigError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::NoProjectSelected.into());
    }
    Ok(trimmed)
}

fn project_not_found(name: &str) -> TwigError {
    NotFoundError::Project {
        name: name.to_string(),
    }
    .into()
}

fn task_not_found(project: &str, id: &TaskId) -> TwigError {
    NotFoundError::Task {
        project: project.to_string(),
        id: id.to_string(),
    }
    .into()
}
