//! `twig status` command - Show branches, staging and working tree changes.

use anyhow::Result;
use twig_core::StatusReport;

use super::utils::open_repo;
use crate::output;

/// Run the status command.
pub fn run(json: bool) -> Result<()> {
    let repo = open_repo()?;
    let report = repo.status()?;

    if json {
        output::essential(&serde_json::to_string_pretty(&report)?);
    } else {
        output::essential(&render(&report));
    }
    Ok(())
}

/// The five status sections, each followed by a blank line.
fn render(report: &StatusReport) -> String {
    let branches = report
        .branches
        .iter()
        .map(|name| output::branch_entry(name, *name == report.current_branch));
    let unstaged = report
        .unstaged
        .iter()
        .map(|change| format!("{} ({})", change.file, change.kind.label()));

    let mut text = String::new();
    push_section(&mut text, "Branches", branches);
    push_section(&mut text, "Staged Files", report.staged.iter().cloned());
    push_section(&mut text, "Removed Files", report.removed.iter().cloned());
    push_section(&mut text, "Modifications Not Staged For Commit", unstaged);
    push_section(&mut text, "Untracked Files", report.untracked.iter().cloned());
    text.pop();
    text
}

fn push_section(text: &mut String, title: &str, lines: impl Iterator<Item = String>) {
    text.push_str(&output::section(title));
    text.push('\n');
    for line in lines {
        text.push_str(&line);
        text.push('\n');
    }
    text.push('\n');
}
