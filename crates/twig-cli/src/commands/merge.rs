//! `twig merge` command - Merge a branch into the current branch.

use anyhow::Result;
use twig_core::MergeOutcome;

use super::utils::open_repo;
use crate::output;

/// Run the merge command.
pub fn run(branch: &str) -> Result<()> {
    let repo = open_repo()?;
    let outcome = repo.merge(branch)?;
    report(&outcome);
    Ok(())
}

/// Print the result of a merge, shared with `pull`.
pub fn report(outcome: &MergeOutcome) {
    match outcome {
        MergeOutcome::FastForward(_) => output::success("Current branch fast-forwarded."),
        MergeOutcome::Merged { commit, conflicts } => {
            if conflicts.is_empty() {
                output::success(&format!("Merged as {}", output::commit_ref(commit)));
            } else {
                output::warn("Encountered a merge conflict.");
                output::detail(&output::conflict_list(conflicts));
            }
        }
    }
}
