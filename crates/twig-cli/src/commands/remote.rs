//! Remote commands: `add-remote`, `rm-remote`, `push`, `fetch` and `pull`.

use std::path::Path;

use anyhow::Result;
use twig_store::TransferStats;

use super::utils::open_repo;
use crate::output;

/// Run the add-remote command.
pub fn run_add(name: &str, address: &Path) -> Result<()> {
    let mut repo = open_repo()?;
    repo.add_remote(name, address)?;
    output::success(&format!("Added remote {name}"));
    Ok(())
}

/// Run the rm-remote command.
pub fn run_remove(name: &str) -> Result<()> {
    let mut repo = open_repo()?;
    repo.remove_remote(name)?;
    output::success(&format!("Removed remote {name}"));
    Ok(())
}

/// Run the push command.
pub fn run_push(remote: &str, branch: &str) -> Result<()> {
    let repo = open_repo()?;
    let outcome = repo.push(remote, branch)?;

    let range = outcome.previous.map_or_else(
        || format!("new branch at {}", output::commit_ref(&outcome.head)),
        |previous| {
            format!(
                "{}..{}",
                output::commit_ref(&previous),
                output::commit_ref(&outcome.head)
            )
        },
    );
    output::success(&format!("Pushed to {remote}/{branch} ({range})"));
    output::detail(&transfer_summary(outcome.transferred));
    Ok(())
}

/// Run the fetch command.
pub fn run_fetch(remote: &str, branch: &str) -> Result<()> {
    let repo = open_repo()?;
    let outcome = repo.fetch(remote, branch)?;

    output::success(&format!(
        "Fetched {} at {}",
        outcome.tracking,
        output::commit_ref(&outcome.head)
    ));
    output::detail(&transfer_summary(outcome.transferred));
    Ok(())
}

/// Run the pull command.
pub fn run_pull(remote: &str, branch: &str) -> Result<()> {
    let repo = open_repo()?;
    let outcome = repo.pull(remote, branch)?;

    output::info(&format!(
        "Fetched {} at {}",
        outcome.fetch.tracking,
        output::commit_ref(&outcome.fetch.head)
    ));
    super::merge::report(&outcome.merge);
    Ok(())
}

fn transfer_summary(stats: TransferStats) -> String {
    format!("  {} commit(s), {} blob(s) copied", stats.commits, stats.blobs)
}
