//! `twig commit` command - Record the staged changes.

use anyhow::Result;

use super::utils::open_repo;
use crate::output;

/// Run the commit command.
pub fn run(message: &str) -> Result<()> {
    let repo = open_repo()?;
    let commit = repo.commit(message)?;

    output::success(&format!(
        "[{} {}] {}",
        repo.refs()?.current(),
        output::commit_ref(&commit.id()),
        commit.message()
    ));
    Ok(())
}
