//! `twig checkout` and `twig reset` commands.

use anyhow::Result;

use super::utils::open_repo;
use crate::error::CliError;
use crate::output;

/// What a `checkout` invocation asks for.
#[derive(Debug, PartialEq, Eq)]
enum Checkout<'a> {
    Branch(&'a str),
    File(&'a str),
    FileAt { commit: &'a str, file: &'a str },
}

impl<'a> Checkout<'a> {
    fn parse(target: Option<&'a str>, files: &'a [String]) -> Result<Self, CliError> {
        match (target, files) {
            (Some(branch), []) => Ok(Self::Branch(branch)),
            (None, [file]) => Ok(Self::File(file)),
            (Some(commit), [file]) => Ok(Self::FileAt { commit, file }),
            _ => Err(CliError::IncorrectOperands),
        }
    }
}

/// Run the checkout command.
pub fn run(target: Option<&str>, files: &[String]) -> Result<()> {
    let checkout = Checkout::parse(target, files)?;
    let repo = open_repo()?;

    match checkout {
        Checkout::Branch(name) => {
            repo.checkout_branch(name)?;
            output::success(&format!("Switched to branch {name}"));
        }
        Checkout::File(file) => repo.checkout_file(file)?,
        Checkout::FileAt { commit, file } => repo.checkout_file_at(commit, file)?,
    }
    Ok(())
}

/// Run the reset command.
pub fn run_reset(commit: &str) -> Result<()> {
    let repo = open_repo()?;
    let id = repo.reset(commit)?;
    output::success(&format!(
        "{} is now at {}",
        repo.refs()?.current(),
        output::commit_ref(&id)
    ));
    Ok(())
}
