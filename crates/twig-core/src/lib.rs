//! # twig-core
//!
//! Repository state and algorithms for twig: branch pointers, the staging
//! index, the working tree, commit graph queries, the three-way merge
//! engine, status, and remote synchronization. Objects themselves live in
//! [`twig_store`].
//!
//! [`Repository`] is the entry point. Each of its operations is one complete
//! read-mutate-write transaction over the `.twig` directory.

pub mod branch_name;
pub mod config;
pub mod error;
pub mod graph;
pub mod merge;
pub mod refs;
pub mod repository;
pub mod staging;
pub mod state;
pub mod status;
pub mod sync;
pub mod worktree;

pub use branch_name::BranchName;
pub use config::{Config, GeneralConfig, LogConfig, RemoteConfig};
pub use error::{Error, Result};
pub use merge::{MergeAction, MergePlan};
pub use refs::Refs;
pub use repository::{MergeOutcome, Repository};
pub use staging::Staging;
pub use state::State;
pub use status::{ChangeKind, StatusReport, UnstagedChange};
pub use sync::{FetchOutcome, PullOutcome, PushOutcome};
pub use worktree::Worktree;
