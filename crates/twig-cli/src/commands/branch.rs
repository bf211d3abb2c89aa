//! `twig branch` and `twig rm-branch` commands.

use anyhow::Result;

use super::utils::open_repo;
use crate::output;

/// Run the branch command.
pub fn run_create(name: &str) -> Result<()> {
    let repo = open_repo()?;
    repo.branch(name)?;
    output::success(&format!("Created branch {name}"));
    Ok(())
}

/// Run the rm-branch command.
pub fn run_remove(name: &str) -> Result<()> {
    let repo = open_repo()?;
    repo.remove_branch(name)?;
    output::success(&format!("Removed branch {name}"));
    Ok(())
}
