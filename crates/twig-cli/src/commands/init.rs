//! `twig init` command - Create a repository in the current directory.

use std::env;

use anyhow::Result;
use twig_core::Repository;

use crate::output;

/// Run the init command.
pub fn run() -> Result<()> {
    let repo = Repository::init(env::current_dir()?)?;

    output::success(&format!(
        "Initialized twig repository on branch {}",
        repo.config().general.default_branch
    ));
    output::detail(&format!(
        "  State stored in: {}",
        repo.root().join(twig_core::State::DIR_NAME).display()
    ));
    Ok(())
}
