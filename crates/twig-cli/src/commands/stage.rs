//! `twig add` and `twig rm` commands - Edit the staging index.

use anyhow::Result;

use super::utils::open_repo;

/// Run the add command.
pub fn run_add(file: &str) -> Result<()> {
    let repo = open_repo()?;
    repo.add(file)?;
    Ok(())
}

/// Run the rm command.
pub fn run_rm(file: &str) -> Result<()> {
    let repo = open_repo()?;
    repo.rm(file)?;
    Ok(())
}
