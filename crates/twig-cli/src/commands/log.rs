//! `twig log`, `twig global-log` and `twig find` commands.

use std::fmt::Write as _;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use twig_store::Commit;

use super::utils::open_repo;
use crate::output;

/// A commit as printed by `log --json`.
#[derive(Debug, Serialize)]
struct CommitInfo {
    hash: String,
    parents: Vec<String>,
    date: String,
    message: String,
}

impl From<&Commit> for CommitInfo {
    fn from(commit: &Commit) -> Self {
        Self {
            hash: commit.id().to_hex(),
            parents: commit.parents().map(|id| id.to_hex()).collect(),
            date: commit.timestamp().to_rfc3339(),
            message: commit.message().to_string(),
        }
    }
}

/// Run the log command.
pub fn run(json: bool) -> Result<()> {
    let repo = open_repo()?;
    let commits = repo.log()?;

    if json {
        let infos: Vec<CommitInfo> = commits.iter().map(CommitInfo::from).collect();
        output::essential(&serde_json::to_string_pretty(&infos)?);
    } else {
        print_commits(&commits, &repo.config().log.date_format);
    }
    Ok(())
}

/// Run the global-log command.
pub fn run_global() -> Result<()> {
    let repo = open_repo()?;
    print_commits(&repo.global_log()?, &repo.config().log.date_format);
    Ok(())
}

/// Run the find command.
pub fn run_find(message: &str) -> Result<()> {
    let repo = open_repo()?;
    for id in repo.find(message)? {
        output::essential(&id.to_hex());
    }
    Ok(())
}

fn print_commits(commits: &[Commit], date_format: &str) {
    for commit in commits {
        output::essential(&render_commit(commit, date_format));
    }
}

/// One log entry, ending with a blank line.
fn render_commit(commit: &Commit, date_format: &str) -> String {
    let mut text = String::from("===\n");
    let _ = writeln!(text, "commit {}", commit.id());
    if let (Some(first), Some(second)) = (commit.parent1(), commit.parent2()) {
        let _ = writeln!(text, "Merge: {} {}", first.short(), second.short());
    }
    let _ = writeln!(text, "Date: {}", format_date(commit.timestamp(), date_format));
    let _ = writeln!(text, "{}", commit.message());
    text
}

fn format_date(timestamp: DateTime<Utc>, date_format: &str) -> String {
    let local = timestamp.with_timezone(&Local);
    let mut text = String::new();
    if write!(text, "{}", local.format(date_format)).is_err() {
        tracing::warn!(format = date_format, "invalid log.date_format, using RFC 2822");
        return local.to_rfc2822();
    }
    text
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_render_plain_commit() {
        let commit = Commit::initial().unwrap();
        let text = render_commit(&commit, "%Y");

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "===");
        assert_eq!(lines[1], format!("commit {}", commit.id().to_hex()));
        assert!(lines[2].starts_with("Date: 19"));
        assert_eq!(lines[3], "initial commit");
        assert!(!text.contains("Merge:"));
    }

    #[test]
    fn test_render_merge_commit() {
        let first = Commit::initial().unwrap();
        let second = Commit::new("other", Utc::now(), BTreeMap::new(), None, None).unwrap();
        let merge = Commit::new(
            "Merged b1 into master.",
            Utc::now(),
            BTreeMap::new(),
            Some(first.id()),
            Some(second.id()),
        )
        .unwrap();

        let text = render_commit(&merge, "%Y");
        assert!(text.contains(&format!(
            "\nMerge: {} {}\n",
            first.id().short(),
            second.id().short()
        )));
    }

    #[test]
    fn test_invalid_date_format_falls_back() {
        let date = format_date(DateTime::<Utc>::UNIX_EPOCH, "%Q%");
        assert!(!date.is_empty());
    }
}
