//! `tw check` — consistency report over the whole store.
//!
//! Exits non-zero when any issue is found so it can gate scripts.

use std::io::Write;

use serde::Serialize;
use twig_core::Store;
use twig_core::model::Project;
use twig_core::tree::TreeIssue;

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub ok: bool,
    pub store: String,
    pub projects: usize,
    pub tasks: usize,
    pub issues: Vec<TreeIssue>,
}

impl CheckReport {
    pub fn of(store: &Store) -> Self {
        let issues = store.validate();
        Self {
            ok: issues.is_empty(),
            store: store.path().display().to_string(),
            projects: store.projects().len(),
            tasks: store.projects().values().map(Project::task_count).sum(),
            issues,
        }
    }
}

pub fn run_check(store: &Store, output: OutputMode) -> anyhow::Result<()> {
    let report = CheckReport::of(store);
    tracing::debug!(issues = report.issues.len(), "consistency check finished");
    render_mode(output, &report, render_check_text, render_check_pretty)?;
    if !report.ok {
        anyhow::bail!("{} consistency issue(s) found", report.issues.len());
    }
    Ok(())
}

fn render_check_text(report: &CheckReport, w: &mut dyn Write) -> std::io::Result<()> {
    for issue in &report.issues {
        writeln!(w, "{issue}")?;
    }
    Ok(())
}

fn render_check_pretty(report: &CheckReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Store check")?;
    pretty_kv(w, "store", &report.store)?;
    pretty_kv(w, "projects", report.projects.to_string())?;
    pretty_kv(w, "tasks", report.tasks.to_string())?;
    writeln!(w)?;
    if report.ok {
        return writeln!(w, "✓ No issues found");
    }
    writeln!(w, "✗ {} issue(s):", report.issues.len())?;
    for issue in &report.issues {
        writeln!(w, "  {issue}")?;
    }
    Ok(())
}
