//! `tw task` — add, edit, complete, and delete tasks inside a project.
//!
//! Tasks are addressed by project name plus task ID (`root.2.1`). IDs are
//! printed by `tw tree` and by `tw task add`.

use std::io::{self, Read, Write};

use clap::{Args, Subcommand};
use serde::Serialize;
use twig_core::Store;
use twig_core::model::{Task, TaskId};
use twig_core::tree::TaskProgress;

use super::fail;
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    #[command(
        about = "Add a task",
        long_about = "Add a root task to a project, or a subtask under --parent.",
        after_help = "EXAMPLES:\n    # Add a root task\n    tw task add Home \"Buy milk\"\n\n    # Add a subtask\n    tw task add Home \"2% milk\" --parent root.1\n\n    # Emit machine-readable output\n    tw task add Home \"Buy milk\" --json"
    )]
    Add(TaskAddArgs),

    #[command(
        about = "Rename a task",
        after_help = "EXAMPLES:\n    # Rename a task\n    tw task rename Home root.1 \"Buy oat milk\""
    )]
    Rename(TaskRenameArgs),

    #[command(
        about = "Replace a task's note",
        long_about = "Replace a task's note. Without TEXT the note is read from stdin. An empty TEXT clears the note.",
        after_help = "EXAMPLES:\n    # Set a note\n    tw task note Home root.1 \"Whole milk only\"\n\n    # Read the note from a file\n    tw task note Home root.1 < note.txt\n\n    # Clear the note\n    tw task note Home root.1 \"\""
    )]
    Note(TaskNoteArgs),

    #[command(
        about = "Mark a task as done",
        after_help = "EXAMPLES:\n    # Complete a task\n    tw task done Home root.1.1"
    )]
    Done(TaskRef),

    #[command(
        about = "Mark a task as not done",
        after_help = "EXAMPLES:\n    # Reopen a task\n    tw task undo Home root.1.1"
    )]
    Undo(TaskRef),

    #[command(
        about = "Delete a task and its subtasks",
        after_help = "EXAMPLES:\n    # Delete a task\n    tw task delete Home root.2"
    )]
    Delete(TaskRef),

    #[command(
        about = "Show one task",
        after_help = "EXAMPLES:\n    # Show a task\n    tw task show Home root.1\n\n    # Emit machine-readable output\n    tw task show Home root.1 --json"
    )]
    Show(TaskRef),
}

/// Project and task ID naming one task.
#[derive(Args, Debug, Clone)]
pub struct TaskRef {
    /// Project containing the task.
    pub project: String,
    /// Task ID, e.g. root.1 or root.1.2.
    pub id: String,
}

#[derive(Args, Debug)]
pub struct TaskAddArgs {
    /// Project to add the task to.
    pub project: String,
    /// Task name. Surrounding whitespace is trimmed.
    pub name: String,
    /// Add as a subtask of this task ID instead of as a root task.
    #[arg(long, short)]
    pub parent: Option<String>,
}

#[derive(Args, Debug)]
pub struct TaskRenameArgs {
    #[command(flatten)]
    pub task: TaskRef,
    /// New task name.
    pub name: String,
}

#[derive(Args, Debug)]
pub struct TaskNoteArgs {
    #[command(flatten)]
    pub task: TaskRef,
    /// Note text. Read from stdin when omitted.
    pub text: Option<String>,
}

/// A task as shown by `tw task` commands.
#[derive(Debug, Serialize)]
pub struct TaskView {
    pub project: String,
    pub id: String,
    /// ID without the `root.` prefix.
    pub number: String,
    pub name: String,
    pub completed: bool,
    pub created_time: String,
    pub completed_time: String,
    pub note: String,
    /// Number of direct subtasks.
    pub subtasks: usize,
    /// Progress over every task below this one.
    pub progress: TaskProgress,
}

impl TaskView {
    pub fn new(project: &str, id: &str, task: &Task) -> Self {
        Self {
            project: project.to_string(),
            id: id.to_string(),
            number: display_number(id),
            name: task.name.clone(),
            completed: task.completed,
            created_time: task.created_time.clone(),
            completed_time: task.completed_time.clone(),
            note: task.note.clone(),
            subtasks: task.subtasks.len(),
            progress: TaskProgress::of_tasks(&task.subtasks),
        }
    }

    const fn status(&self) -> &'static str {
        if self.completed { "done" } else { "open" }
    }
}

#[derive(Debug, Serialize)]
struct TaskDeleted {
    project: String,
    id: String,
    name: String,
    removed_subtasks: usize,
}

/// `root.3.1` → `3.1`; keys that are not task IDs are shown as stored.
pub fn display_number(id: &str) -> String {
    TaskId::parse(id).map_or_else(|_| id.to_string(), |parsed| parsed.display_number())
}

pub fn run_task(command: &TaskCommand, store: &mut Store, output: OutputMode) -> anyhow::Result<()> {
    match command {
        TaskCommand::Add(args) => run_add(args, store, output),
        TaskCommand::Rename(args) => {
            store
                .rename_task(&args.task.project, &args.task.id, &args.name)
                .map_err(|e| fail(output, e))?;
            announce(store, &args.task, output, "Renamed")
        }
        TaskCommand::Note(args) => run_note(args, store, output),
        TaskCommand::Done(task) => {
            store
                .complete(&task.project, &task.id)
                .map_err(|e| fail(output, e))?;
            announce(store, task, output, "Completed")
        }
        TaskCommand::Undo(task) => {
            store
                .uncomplete(&task.project, &task.id)
                .map_err(|e| fail(output, e))?;
            announce(store, task, output, "Reopened")
        }
        TaskCommand::Delete(task) => run_delete(task, store, output),
        TaskCommand::Show(task) => run_show(task, store, output),
    }
}

fn run_add(args: &TaskAddArgs, store: &mut Store, output: OutputMode) -> anyhow::Result<()> {
    let added = match args.parent.as_deref() {
        Some(parent) => store.add_subtask(&args.project, parent, &args.name),
        None => store.add_root_task(&args.project, &args.name),
    }
    .map_err(|e| fail(output, e))?;

    let task = TaskRef {
        project: args.project.clone(),
        id: added.to_string(),
    };
    announce(store, &task, output, "Added")
}

fn run_note(args: &TaskNoteArgs, store: &mut Store, output: OutputMode) -> anyhow::Result<()> {
    let text = note_text(args, output)?;
    store
        .set_note(&args.task.project, &args.task.id, &text)
        .map_err(|e| fail(output, e))?;
    announce(store, &args.task, output, "Updated note on")
}

fn note_text(args: &TaskNoteArgs, output: OutputMode) -> anyhow::Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    read_note(io::stdin().lock()).or_else(|e| {
        let message = format!("failed to read note from stdin: {e}");
        render_error(output, &CliError::new(&message))?;
        Err(anyhow::anyhow!(message))
    })
}

/// Read a note body, dropping the trailing line break editors and `echo` add.
fn read_note(mut reader: impl Read) -> io::Result<String> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    let trimmed = buf.trim_end_matches(['\n', '\r']).len();
    buf.truncate(trimmed);
    Ok(buf)
}

fn run_delete(task: &TaskRef, store: &mut Store, output: OutputMode) -> anyhow::Result<()> {
    let removed = store
        .delete_task(&task.project, &task.id)
        .map_err(|e| fail(output, e))?;
    let deleted = TaskDeleted {
        project: task.project.clone(),
        id: task.id.clone(),
        name: removed.name.clone(),
        removed_subtasks: removed.descendant_count(),
    };
    render_mode(
        output,
        &deleted,
        |d, w| writeln!(w, "{}\t{}", d.id, d.removed_subtasks),
        |d, w| {
            write!(w, "✓ Deleted task {} '{}'", display_number(&d.id), d.name)?;
            match d.removed_subtasks {
                0 => writeln!(w),
                1 => writeln!(w, " and 1 subtask"),
                n => writeln!(w, " and {n} subtasks"),
            }
        },
    )
}

fn run_show(task: &TaskRef, store: &Store, output: OutputMode) -> anyhow::Result<()> {
    let view = lookup(store, task, output)?;
    render_mode(output, &view, render_show_text, render_show_pretty)
}

/// Re-read the task after a change and report it.
fn announce(store: &Store, task: &TaskRef, output: OutputMode, verb: &str) -> anyhow::Result<()> {
    let view = lookup(store, task, output)?;
    render_mode(output, &view, render_row_text, |v, w| {
        writeln!(w, "✓ {verb} task {} '{}'", v.number, v.name)?;
        writeln!(w, "  id: {}", v.id)
    })
}

fn lookup(store: &Store, task: &TaskRef, output: OutputMode) -> anyhow::Result<TaskView> {
    let found = store
        .task(&task.project, &task.id)
        .map_err(|e| fail(output, e))?;
    let id = TaskId::parse(&task.id).map_or_else(|_| task.id.clone(), |id| id.to_string());
    Ok(TaskView::new(&task.project, &id, found))
}

fn render_row_text(view: &TaskView, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}\t{}\t{}", view.id, view.status(), view.name)
}

fn render_show_text(view: &TaskView, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "id:             {}", view.id)?;
    writeln!(w, "name:           {}", view.name)?;
    writeln!(w, "status:         {}", view.status())?;
    writeln!(w, "created_time:   {}", view.created_time)?;
    writeln!(w, "completed_time: {}", view.completed_time)?;
    writeln!(w, "subtasks:       {}", view.progress)?;
    writeln!(w, "note:")?;
    for line in view.note.lines() {
        writeln!(w, "  {line}")?;
    }
    Ok(())
}

fn render_show_pretty(view: &TaskView, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Task {}  {}", view.number, view.name))?;
    pretty_kv(w, "id", &view.id)?;
    pretty_kv(w, "project", &view.project)?;
    pretty_kv(
        w,
        "status",
        if view.completed { "✓ done" } else { "open" },
    )?;
    pretty_kv(w, "created", &view.created_time)?;
    if view.completed {
        pretty_kv(w, "completed", &view.completed_time)?;
    }
    if view.subtasks > 0 {
        pretty_kv(w, "subtasks", view.progress.to_string())?;
    }
    if !view.note.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Note")?;
        for line in view.note.lines() {
            writeln!(w, "{line}")?;
        }
    }
    Ok(())
}
