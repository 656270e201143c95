//! `tw tree` — a project's tasks in display order, indented by depth.

use std::io::Write;

use clap::Args;
use serde::Serialize;
use twig_core::Store;
use twig_core::tree::{TaskProgress, TreeEntry};

use super::fail;
use super::task::display_number;
use crate::output::{OutputMode, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Project to show.
    pub project: String,
}

#[derive(Debug, Serialize)]
pub struct TreeOutput {
    pub project: String,
    pub progress: TaskProgress,
    pub tasks: Vec<TreeRow>,
}

/// One task in pre-order.
#[derive(Debug, Serialize)]
pub struct TreeRow {
    pub id: String,
    pub number: String,
    pub level: usize,
    pub name: String,
    pub completed: bool,
    pub completed_time: String,
    pub note: String,
}

impl From<&TreeEntry<'_>> for TreeRow {
    fn from(entry: &TreeEntry<'_>) -> Self {
        Self {
            id: entry.id.to_string(),
            number: display_number(entry.id),
            level: entry.level,
            name: entry.task.name.clone(),
            completed: entry.task.completed,
            completed_time: entry.task.completed_time.clone(),
            note: entry.task.note.clone(),
        }
    }
}

pub fn run_tree(args: &TreeArgs, store: &Store, output: OutputMode) -> anyhow::Result<()> {
    let tree = build_tree(store, &args.project).map_err(|e| fail(output, e))?;
    render_mode(output, &tree, render_tree_text, render_tree_pretty)
}

fn build_tree(store: &Store, project: &str) -> Result<TreeOutput, twig_core::TwigError> {
    let tasks = store
        .walk(project)?
        .iter()
        .map(TreeRow::from)
        .collect();
    Ok(TreeOutput {
        project: project.to_string(),
        progress: store.progress(project)?,
        tasks,
    })
}

fn render_tree_text(tree: &TreeOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for row in &tree.tasks {
        let status = if row.completed { "done" } else { "open" };
        writeln!(w, "{}\t{}\t{}\t{}", row.id, row.level, status, row.name)?;
    }
    Ok(())
}

fn render_tree_pretty(tree: &TreeOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("{}  {}", tree.project, tree.progress))?;
    if tree.tasks.is_empty() {
        return writeln!(
            w,
            "No tasks. Add one with `tw task add {} <NAME>`.",
            quote_arg(&tree.project)
        );
    }
    for row in &tree.tasks {
        let indent = "    ".repeat(row.level);
        let check = if row.completed { "[x]" } else { "[ ]" };
        let note = if row.note.is_empty() { "" } else { "  ✎" };
        writeln!(w, "{indent}{check} {}  {}{note}", row.number, row.name)?;
    }
    Ok(())
}

fn quote_arg(raw: &str) -> String {
    if raw.contains(char::is_whitespace) {
        format!("\"{raw}\"")
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use twig_core::WritePolicy;
    use twig_core::clock::SystemClock;
    use twig_core::model::Projects;

    fn sample_store() -> Store {
        let mut store = Store::from_projects(
            PathBuf::from("unused.json"),
            Projects::new(),
            WritePolicy::Deferred,
            SystemClock,
        );
        store.add_project("Home").expect("project");
        store.add_root_task("Home", "Buy milk").expect("task");
        store.add_subtask("Home", "root.1", "2% milk").expect("subtask");
        store.add_root_task("Home", "Water plants").expect("task");
        store.complete("Home", "root.1.1").expect("done");
        store.set_note("Home", "root.2", "balcony too").expect("note");
        store
    }

    fn rendered(f: fn(&TreeOutput, &mut dyn Write) -> std::io::Result<()>, tree: &TreeOutput) -> String {
        let mut buf = Vec::new();
        f(tree, &mut buf).expect("render");
        String::from_utf8(buf).expect("utf-8")
    }

    #[test]
    fn tree_args_parse_project() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: TreeArgs,
        }
        let w = Wrapper::parse_from(["test", "Home"]);
        assert_eq!(w.args.project, "Home");
    }

    #[test]
    fn rows_are_preorder_with_numbers() {
        let tree = build_tree(&sample_store(), "Home").expect("tree");
        let rows: Vec<(&str, &str, usize)> = tree
            .tasks
            .iter()
            .map(|r| (r.id.as_str(), r.number.as_str(), r.level))
            .collect();
        assert_eq!(
            rows,
            [("root.1", "1", 0), ("root.1.1", "1.1", 1), ("root.2", "2", 0)]
        );
        assert_eq!(tree.progress, TaskProgress { done: 1, total: 3 });
    }

    #[test]
    fn missing_project_is_not_found() {
        let err = build_tree(&sample_store(), "Garden").expect_err("missing");
        assert!(err.is_not_found());
    }

    #[test]
    fn pretty_indents_and_marks() {
        let tree = build_tree(&sample_store(), "Home").expect("tree");
        let text = rendered(render_tree_pretty, &tree);
        assert!(text.starts_with("Home  1/3 (33%)\n"));
        assert!(text.contains("\n[ ] 1  Buy milk\n"));
        assert!(text.contains("\n    [x] 1.1  2% milk\n"));
        assert!(text.contains("\n[ ] 2  Water plants  ✎\n"));
    }

    #[test]
    fn text_is_tab_separated() {
        let tree = build_tree(&sample_store(), "Home").expect("tree");
        let text = rendered(render_tree_text, &tree);
        assert_eq!(
            text,
            "root.1\t0\topen\tBuy milk\nroot.1.1\t1\tdone\t2% milk\nroot.2\t0\topen\tWater plants\n"
        );
    }

    #[test]
    fn empty_project_has_hint() {
        let mut store = sample_store();
        store.add_project("Side project").expect("project");
        let tree = build_tree(&store, "Side project").expect("tree");
        let text = rendered(render_tree_pretty, &tree);
        assert!(text.contains("tw task add \"Side project\" <NAME>"));
    }
}
