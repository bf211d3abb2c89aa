//! Error types for twig-core.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in twig-core operations.
///
/// Every variant renders as a single line suitable for showing to the user.
/// A command that returns one of these has not changed repository state.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No `.twig` directory in the working directory.
    #[error("Not in an initialized twig directory.")]
    RepositoryNotInitialized,

    /// `init` ran where a repository already exists.
    #[error("A twig version-control system already exists in the current directory.")]
    RepositoryAlreadyExists,

    /// A working-tree file named by the user does not exist.
    #[error("File does not exist.")]
    FileNotFound(String),

    /// A file operand that is not a plain top-level file name.
    #[error("invalid file name '{0}': only files directly in the repository root are tracked")]
    InvalidFileName(String),

    /// The commit does not track the requested file.
    #[error("File does not exist in that commit.")]
    FileNotInCommit(String),

    /// `commit` with an empty message.
    #[error("Please enter a commit message.")]
    EmptyCommitMessage,

    /// `commit` with both stages empty.
    #[error("No changes added to the commit.")]
    NoChangesStaged,

    /// `rm` of a file neither staged nor tracked.
    #[error("No reason to remove the file.")]
    NothingToRemove(String),

    /// `find` matched no commit.
    #[error("Found no commit with that message.")]
    NoCommitWithMessage(String),

    /// Branch name already taken.
    #[error("A branch with that name already exists.")]
    BranchExists(String),

    /// Branch not found.
    #[error("A branch with that name does not exist.")]
    BranchNotFound(String),

    /// Invalid branch name.
    #[error("invalid branch name '{name}': {reason}")]
    InvalidBranchName {
        /// The invalid name.
        name: String,
        /// Why the name is invalid.
        reason: String,
    },

    /// Remote name that cannot be used as the first part of a tracking branch.
    #[error("invalid remote name '{name}': {reason}")]
    InvalidRemoteName {
        /// The invalid name.
        name: String,
        /// Why the name is invalid.
        reason: String,
    },

    /// `rm-branch` of the checked-out branch.
    #[error("Cannot remove the current branch.")]
    CannotRemoveCurrentBranch,

    /// `checkout` of the checked-out branch.
    #[error("No need to checkout the current branch.")]
    CheckoutCurrentBranch,

    /// An untracked working file would be overwritten.
    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedFileConflict(String),

    /// `merge` of the current branch into itself.
    #[error("Cannot merge a branch with itself.")]
    MergeSelf,

    /// `merge` of a branch whose head is already in the current history.
    #[error("Given branch is an ancestor of the current branch.")]
    AncestorBranch,

    /// `merge` with pending staged changes.
    #[error("You have uncommitted changes.")]
    UncommittedChangesPresentForMerge,

    /// Remote name not registered.
    #[error("A remote with that name does not exist.")]
    RemoteNotFound(String),

    /// Remote name already registered.
    #[error("A remote with that name already exists.")]
    RemoteAlreadyExists(String),

    /// The remote's address holds no repository.
    #[error("Remote directory not found.")]
    RemoteUnreachable(PathBuf),

    /// Push would discard remote history.
    #[error("Please pull down remote changes before pushing.")]
    NonFastForwardPush,

    /// The remote lacks the requested branch.
    #[error("That remote does not have that branch.")]
    RemoteBranchNotFound(String),

    /// State file parsing error.
    #[error("failed to parse {file}: {message}")]
    StateParseError { file: PathBuf, message: String },

    /// Object store error.
    #[error(transparent)]
    Store(#[from] twig_store::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
