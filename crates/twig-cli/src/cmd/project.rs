//! `tw project` — create, rename, delete, and list projects.

use std::io::Write;

use clap::{Args, Subcommand};
use serde::Serialize;
use twig_core::Store;
use twig_core::tree::TaskProgress;

use super::fail;
use crate::output::{OutputMode, pretty_section, render_mode};

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    #[command(
        about = "Create an empty project",
        after_help = "EXAMPLES:\n    # Create a project\n    tw project add \"Home chores\"\n\n    # Emit machine-readable output\n    tw project add Garden --json"
    )]
    Add(ProjectAddArgs),

    #[command(
        about = "Rename a project",
        long_about = "Rename a project, keeping all of its tasks. The renamed project moves to the end of the list.",
        after_help = "EXAMPLES:\n    # Rename a project\n    tw project rename Garden \"Garden 2025\""
    )]
    Rename(ProjectRenameArgs),

    #[command(
        about = "Delete a project and all of its tasks",
        after_help = "EXAMPLES:\n    # Delete a project\n    tw project delete Garden"
    )]
    Delete(ProjectDeleteArgs),

    #[command(
        about = "List projects with completion progress",
        after_help = "EXAMPLES:\n    # List projects\n    tw project list\n\n    # Emit machine-readable output\n    tw project list --json"
    )]
    List,
}

#[derive(Args, Debug)]
pub struct ProjectAddArgs {
    /// Name of the new project. Surrounding whitespace is trimmed.
    pub name: String,
}

#[derive(Args, Debug)]
pub struct ProjectRenameArgs {
    /// Current project name.
    pub old: String,
    /// New project name.
    pub new: String,
}

#[derive(Args, Debug)]
pub struct ProjectDeleteArgs {
    /// Project to delete.
    pub name: String,
}

/// One row of `tw project list`.
#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    #[serde(flatten)]
    pub progress: TaskProgress,
}

#[derive(Debug, Serialize)]
struct ProjectRenamed {
    from: String,
    to: String,
}

#[derive(Debug, Serialize)]
struct ProjectDeleted {
    name: String,
    removed_tasks: usize,
}

pub fn run_project(
    command: &ProjectCommand,
    store: &mut Store,
    output: OutputMode,
) -> anyhow::Result<()> {
    match command {
        ProjectCommand::Add(args) => run_add(args, store, output),
        ProjectCommand::Rename(args) => run_rename(args, store, output),
        ProjectCommand::Delete(args) => run_delete(args, store, output),
        ProjectCommand::List => run_list(store, output),
    }
}

fn run_add(args: &ProjectAddArgs, store: &mut Store, output: OutputMode) -> anyhow::Result<()> {
    let name = store
        .add_project(&args.name)
        .map_err(|e| fail(output, e))?;
    let summary = ProjectSummary {
        name,
        progress: TaskProgress::default(),
    };
    render_mode(
        output,
        &summary,
        |s, w| writeln!(w, "{}", s.name),
        |s, w| writeln!(w, "✓ Created project '{}'", s.name),
    )
}

fn run_rename(
    args: &ProjectRenameArgs,
    store: &mut Store,
    output: OutputMode,
) -> anyhow::Result<()> {
    let to = store
        .rename_project(&args.old, &args.new)
        .map_err(|e| fail(output, e))?;
    let renamed = ProjectRenamed {
        from: args.old.trim().to_string(),
        to,
    };
    render_mode(
        output,
        &renamed,
        |r, w| writeln!(w, "{}\t{}", r.from, r.to),
        |r, w| writeln!(w, "✓ Renamed project '{}' to '{}'", r.from, r.to),
    )
}

fn run_delete(
    args: &ProjectDeleteArgs,
    store: &mut Store,
    output: OutputMode,
) -> anyhow::Result<()> {
    let removed = store
        .delete_project(&args.name)
        .map_err(|e| fail(output, e))?;
    let deleted = ProjectDeleted {
        name: args.name.trim().to_string(),
        removed_tasks: removed.task_count(),
    };
    render_mode(
        output,
        &deleted,
        |d, w| writeln!(w, "{}\t{}", d.name, d.removed_tasks),
        |d, w| {
            writeln!(
                w,
                "✓ Deleted project '{}' ({} task{})",
                d.name,
                d.removed_tasks,
                if d.removed_tasks == 1 { "" } else { "s" }
            )
        },
    )
}

fn run_list(store: &Store, output: OutputMode) -> anyhow::Result<()> {
    let summaries = list_projects(store);
    render_mode(
        output,
        summaries.as_slice(),
        render_list_text,
        render_list_pretty,
    )
}

/// Every project in store order with its task progress.
pub fn list_projects(store: &Store) -> Vec<ProjectSummary> {
    store
        .projects()
        .iter()
        .map(|(name, project)| ProjectSummary {
            name: name.to_string(),
            progress: TaskProgress::of_tasks(&project.tasks),
        })
        .collect()
}

fn render_list_text(summaries: &[ProjectSummary], w: &mut dyn Write) -> std::io::Result<()> {
    for s in summaries {
        writeln!(w, "{}\t{}\t{}", s.name, s.progress.done, s.progress.total)?;
    }
    Ok(())
}

fn render_list_pretty(summaries: &[ProjectSummary], w: &mut dyn Write) -> std::io::Result<()> {
    if summaries.is_empty() {
        return writeln!(w, "No projects. Create one with `tw project add <NAME>`.");
    }
    pretty_section(w, &format!("Projects ({})", summaries.len()))?;
    let width = summaries
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0);
    for s in summaries {
        let mark = if s.progress.total > 0 && s.progress.is_complete() {
            "✓"
        } else {
            " "
        };
        writeln!(w, "{mark} {:<width$}  {}", s.name, s.progress)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;
    use twig_core::WritePolicy;
    use twig_core::clock::SystemClock;
    use twig_core::model::Projects;

    #[derive(Parser)]
    struct Wrapper {
        #[command(subcommand)]
        command: ProjectCommand,
    }

    fn memory_store() -> Store {
        Store::from_projects(
            PathBuf::from("unused.json"),
            Projects::new(),
            WritePolicy::Deferred,
            SystemClock,
        )
    }

    #[test]
    fn add_parses_name() {
        let w = Wrapper::parse_from(["test", "add", "Home chores"]);
        assert!(matches!(w.command, ProjectCommand::Add(ProjectAddArgs { ref name }) if name == "Home chores"));
    }

    #[test]
    fn rename_parses_old_and_new() {
        let w = Wrapper::parse_from(["test", "rename", "A", "B"]);
        match w.command {
            ProjectCommand::Rename(args) => {
                assert_eq!(args.old, "A");
                assert_eq!(args.new, "B");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rename_requires_both_names() {
        assert!(Wrapper::try_parse_from(["test", "rename", "A"]).is_err());
    }

    #[test]
    fn list_reports_progress_in_store_order() {
        let mut store = memory_store();
        store.add_project("B").expect("add");
        store.add_project("A").expect("add");
        store.add_root_task("A", "one").expect("task");
        store.add_root_task("A", "two").expect("task");
        store.complete("A", "root.2").expect("done");

        let summaries = list_projects(&store);
        let rows: Vec<(&str, u32, u32)> = summaries
            .iter()
            .map(|s| (s.name.as_str(), s.progress.done, s.progress.total))
            .collect();
        assert_eq!(rows, [("B", 0, 0), ("A", 1, 2)]);
    }

    #[test]
    fn list_json_flattens_progress() {
        let summary = ProjectSummary {
            name: "P".into(),
            progress: TaskProgress { done: 1, total: 3 },
        };
        let value = serde_json::to_value(&summary).expect("json");
        assert_eq!(value, serde_json::json!({"name": "P", "done": 1, "total": 3}));
    }

    #[test]
    fn pretty_list_aligns_and_marks_finished_projects() {
        let summaries = vec![
            ProjectSummary {
                name: "Errands".into(),
                progress: TaskProgress { done: 2, total: 2 },
            },
            ProjectSummary {
                name: "Garden".into(),
                progress: TaskProgress { done: 0, total: 4 },
            },
        ];
        let mut buf = Vec::new();
        render_list_pretty(&summaries, &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf-8");
        assert!(text.contains("✓ Errands  2/2 (100%)"));
        assert!(text.contains("  Garden   0/4 (0%)"));
    }

    #[test]
    fn pretty_list_empty_has_hint() {
        let mut buf = Vec::new();
        render_list_pretty(&[], &mut buf).expect("render");
        assert!(String::from_utf8(buf).expect("utf-8").contains("tw project add"));
    }
}
