//! Remote registration and synchronization.
//!
//! A remote is another repository reachable through the filesystem. Push and
//! fetch open it as a second [`Repository`] and copy objects between the two
//! stores; nothing else is shared.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use twig_store::{ObjectId, TransferStats, transfer_commit};

use crate::branch_name::BranchName;
use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use crate::graph;
use crate::repository::{MergeOutcome, Repository};
use crate::state::State;

/// Result of a successful `push`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushOutcome {
    /// The remote branch's previous head, if it existed.
    pub previous: Option<ObjectId>,
    /// The remote branch's new head.
    pub head: ObjectId,
    pub transferred: TransferStats,
}

/// Result of a successful `fetch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Local branch now tracking the remote branch.
    pub tracking: BranchName,
    pub head: ObjectId,
    pub transferred: TransferStats,
}

/// Result of a successful `pull`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullOutcome {
    pub fetch: FetchOutcome,
    pub merge: MergeOutcome,
}

/// Strip a trailing `.twig` component: an address may name either the
/// remote's working tree or its metadata directory.
fn normalize_address(address: &Path) -> PathBuf {
    if address.file_name().is_some_and(|name| name == State::DIR_NAME) {
        if let Some(parent) = address.parent() {
            return if parent.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                parent.to_path_buf()
            };
        }
    }
    address.to_path_buf()
}

impl Repository {
    /// Register a remote.
    ///
    /// # Errors
    /// Returns `InvalidRemoteName` for an empty name or one containing `/`,
    /// and `RemoteAlreadyExists` if the name is taken.
    pub fn add_remote(&mut self, name: &str, address: impl AsRef<Path>) -> Result<()> {
        if name.is_empty() || name.contains('/') {
            return Err(Error::InvalidRemoteName {
                name: name.to_string(),
                reason: "remote names cannot be empty or contain '/'".into(),
            });
        }
        if self.config().remotes.contains_key(name) {
            return Err(Error::RemoteAlreadyExists(name.to_string()));
        }

        let path = normalize_address(address.as_ref());
        self.config_mut()
            .remotes
            .insert(name.to_string(), RemoteConfig { path: path.clone() });
        self.state().save_config(self.config())?;
        debug!(remote = name, path = %path.display(), "added remote");
        Ok(())
    }

    /// Unregister a remote. Fetched tracking branches are kept.
    ///
    /// # Errors
    /// Returns `RemoteNotFound` if no such remote is registered.
    pub fn remove_remote(&mut self, name: &str) -> Result<()> {
        if self.config_mut().remotes.remove(name).is_none() {
            return Err(Error::RemoteNotFound(name.to_string()));
        }
        self.state().save_config(self.config())?;
        debug!(remote = name, "removed remote");
        Ok(())
    }

    /// Open a registered remote as a repository. Relative addresses are
    /// resolved against this repository's root.
    ///
    /// # Errors
    /// Returns `RemoteNotFound` or `RemoteUnreachable`.
    pub fn open_remote(&self, name: &str) -> Result<Self> {
        let remote = self
            .config()
            .remotes
            .get(name)
            .ok_or_else(|| Error::RemoteNotFound(name.to_string()))?;
        let path = if remote.path.is_relative() {
            self.root().join(&remote.path)
        } else {
            remote.path.clone()
        };

        Self::open(&path).map_err(|e| match e {
            Error::RepositoryNotInitialized => Error::RemoteUnreachable(path),
            other => other,
        })
    }

    /// Append local history to `branch` of remote `remote_name`.
    ///
    /// The remote branch must be an ancestor of Head. Commits the remote
    /// lacks are copied with their blobs, then the remote branch moves to
    /// Head. When that branch is checked out in the remote, the remote's
    /// working tree follows.
    ///
    /// # Errors
    /// Returns `RemoteNotFound`, `RemoteUnreachable`, `NonFastForwardPush`,
    /// or `InvalidBranchName`.
    pub fn push(&self, remote_name: &str, branch: &str) -> Result<PushOutcome> {
        let branch_name = BranchName::new(branch)?;
        let remote = self.open_remote(remote_name)?;
        let head = self.refs()?.head()?;
        let mut remote_refs = remote.refs()?;
        let previous = remote_refs.get(branch);

        let known: HashSet<ObjectId> = match previous {
            Some(remote_head) => {
                if !graph::is_ancestor(self.store(), remote_head, head)? {
                    return Err(Error::NonFastForwardPush);
                }
                graph::ancestor_ids(remote.store(), remote_head)?
            }
            None => HashSet::new(),
        };

        let mut transferred = TransferStats::default();
        for commit in graph::ancestors(self.store(), head) {
            let id = commit?.id();
            if !known.contains(&id) {
                transferred += transfer_commit(self.store(), remote.store(), &id)?;
            }
        }

        if remote_refs.current() == branch {
            remote.switch_to(&remote_refs, head, false)?;
        }
        remote_refs.set(branch_name, head);
        remote.state().save_refs(&remote_refs)?;

        info!(
            remote = remote_name,
            branch,
            commits = transferred.commits,
            blobs = transferred.blobs,
            "pushed"
        );
        Ok(PushOutcome {
            previous,
            head,
            transferred,
        })
    }

    /// Copy the history of `branch` from remote `remote_name` and point the
    /// local branch `remote_name/branch` at it.
    ///
    /// # Errors
    /// Returns `RemoteNotFound`, `RemoteUnreachable` or `RemoteBranchNotFound`.
    pub fn fetch(&self, remote_name: &str, branch: &str) -> Result<FetchOutcome> {
        let remote = self.open_remote(remote_name)?;
        let head = remote
            .refs()?
            .get(branch)
            .ok_or_else(|| Error::RemoteBranchNotFound(branch.to_string()))?;
        let tracking = BranchName::tracking(remote_name, branch)?;

        let mut transferred = TransferStats::default();
        for commit in graph::ancestors(remote.store(), head) {
            let id = commit?.id();
            transferred += transfer_commit(remote.store(), self.store(), &id)?;
        }

        let mut refs = self.refs()?;
        refs.set(tracking.clone(), head);
        self.state().save_refs(&refs)?;

        info!(
            remote = remote_name,
            branch,
            commits = transferred.commits,
            blobs = transferred.blobs,
            "fetched"
        );
        Ok(FetchOutcome {
            tracking,
            head,
            transferred,
        })
    }

    /// Fetch `branch` from `remote_name`, then merge the tracking branch.
    ///
    /// The merge preconditions that do not depend on the remote's objects
    /// are checked before anything is fetched. An untracked-file conflict
    /// can only be found once the remote history is local, so in that case
    /// the fetch stays in place and the merge is refused.
    ///
    /// # Errors
    /// Returns any error of [`Repository::fetch`] or [`Repository::merge`].
    pub fn pull(&self, remote_name: &str, branch: &str) -> Result<PullOutcome> {
        let tracking = BranchName::tracking(remote_name, branch)?;
        let refs = self.refs()?;
        if !self.state().load_staging()?.is_empty() {
            return Err(Error::UncommittedChangesPresentForMerge);
        }
        if refs.current() == tracking.as_str() {
            return Err(Error::MergeSelf);
        }
        let remote_head = self
            .open_remote(remote_name)?
            .refs()?
            .get(branch)
            .ok_or_else(|| Error::RemoteBranchNotFound(branch.to_string()))?;
        if graph::is_ancestor(self.store(), remote_head, refs.head()?)? {
            return Err(Error::AncestorBranch);
        }

        let fetch = self.fetch(remote_name, branch)?;
        let merge = self.merge(fetch.tracking.as_str())?;
        Ok(PullOutcome { fetch, merge })
    }
}
