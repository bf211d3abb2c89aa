//! Command definitions and dispatch targets.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

pub mod branch;
pub mod checkout;
pub mod commit;
pub mod completions;
pub mod init;
pub mod log;
pub mod merge;
pub mod remote;
pub mod stage;
pub mod status;
mod utils;

/// twig - a small single-user version-control system.
#[derive(Debug, Parser)]
#[command(name = "twig", version, about, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Only print command results and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log internal detail to stderr (overridden by `TWIG_LOG`).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a repository in the current directory.
    Init,

    /// Stage a file's current contents for the next commit.
    Add {
        /// File in the repository root.
        file: String,
    },

    /// Record the staged changes.
    Commit {
        /// Commit message.
        message: String,
    },

    /// Unstage a file, or stage its removal if it is tracked.
    Rm {
        /// File in the repository root.
        file: String,
    },

    /// Show the current branch's history, newest first.
    Log {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show every commit ever made.
    GlobalLog,

    /// Print the ids of commits with the given message.
    Find {
        /// Exact commit message.
        message: String,
    },

    /// Show branches, staged changes and working tree differences.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Restore files or switch branches.
    ///
    /// `checkout <branch>` switches branches, `checkout -- <file>` restores a
    /// file from Head, and `checkout <commit> -- <file>` restores it from
    /// another commit.
    Checkout {
        /// Branch name, or commit id when restoring a file.
        target: Option<String>,

        /// File to restore, given after `--`.
        #[arg(last = true)]
        files: Vec<String>,
    },

    /// Create a branch at the current commit.
    Branch {
        /// New branch name.
        name: String,
    },

    /// Delete a branch pointer.
    RmBranch {
        /// Branch to delete.
        name: String,
    },

    /// Move the current branch to a commit and check it out.
    Reset {
        /// Commit id, possibly abbreviated.
        commit: String,
    },

    /// Merge a branch into the current branch.
    Merge {
        /// Branch to merge.
        branch: String,
    },

    /// Register a remote repository.
    AddRemote {
        /// Remote name.
        name: String,
        /// Directory of the remote repository (or its `.twig` directory).
        address: PathBuf,
    },

    /// Unregister a remote.
    RmRemote {
        /// Remote name.
        name: String,
    },

    /// Append the current branch's history to a remote branch.
    Push {
        /// Remote name.
        remote: String,
        /// Remote branch name.
        branch: String,
    },

    /// Copy a remote branch into `<remote>/<branch>`.
    Fetch {
        /// Remote name.
        remote: String,
        /// Remote branch name.
        branch: String,
    },

    /// Fetch a remote branch and merge it into the current branch.
    Pull {
        /// Remote name.
        remote: String,
        /// Remote branch name.
        branch: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },

    #[command(external_subcommand)]
    External(Vec<String>),
}
