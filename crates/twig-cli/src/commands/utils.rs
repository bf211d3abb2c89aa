use anyhow::Result;
use twig_core::Repository;

/// Open the repository in the current directory.
pub fn open_repo() -> Result<Repository> {
    Ok(Repository::open_current()?)
}
