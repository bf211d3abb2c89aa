//! Repository handle and the local commands.
//!
//! Every public operation reads the persisted state it needs, computes the
//! result, and writes the new state back before returning. All checks that
//! can fail run before the first write, so a failed command leaves the
//! repository as it was.

use std::env;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use twig_store::{Commit, FsStore, ObjectId, ObjectStore};

use crate::branch_name::BranchName;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::graph;
use crate::merge::MergePlan;
use crate::refs::Refs;
use crate::staging::Staging;
use crate::state::State;
use crate::status::StatusReport;
use crate::worktree::Worktree;

/// Result of a successful `merge`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The current branch was behind and now points at the other head.
    FastForward(ObjectId),
    /// A merge commit was created.
    Merged {
        commit: ObjectId,
        /// Files written with conflict markers.
        conflicts: Vec<String>,
    },
}

/// A twig repository: working tree, `.twig` state and object store.
#[derive(Debug)]
pub struct Repository {
    root: PathBuf,
    state: State,
    store: FsStore,
    worktree: Worktree,
    config: Config,
}

impl Repository {
    /// Create a repository in `root` with the initial commit on the
    /// configured default branch.
    ///
    /// # Errors
    /// Returns `RepositoryAlreadyExists`, or an IO error.
    pub fn init(root: impl AsRef<Path>) -> Result<Self> {
        Self::init_with_config(root, Config::default())
    }

    /// Like [`Repository::init`], with an explicit configuration.
    ///
    /// # Errors
    /// Returns `RepositoryAlreadyExists`, `InvalidBranchName`, or an IO error.
    pub fn init_with_config(root: impl AsRef<Path>, config: Config) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let state = State::new(&root);
        if state.is_initialized() {
            return Err(Error::RepositoryAlreadyExists);
        }

        let branch = BranchName::new(config.general.default_branch.clone())?;
        let initial = Commit::initial()?;
        state.init(&Refs::new(branch, initial.id()), &config)?;

        let store = FsStore::new(state.objects_dir());
        store.init()?;
        store.put_commit(&initial)?;

        info!(path = %root.display(), "initialized repository");
        Ok(Self {
            worktree: Worktree::new(&root),
            root,
            state,
            store,
            config,
        })
    }

    /// Open the repository whose working tree is `root`.
    ///
    /// # Errors
    /// Returns `RepositoryNotInitialized` if `root` holds no repository.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let state = State::new(&root);
        if !state.is_initialized() {
            return Err(Error::RepositoryNotInitialized);
        }

        let config = state.load_config()?;
        let store = FsStore::new(state.objects_dir());
        Ok(Self {
            worktree: Worktree::new(&root),
            root,
            state,
            store,
            config,
        })
    }

    /// Open the repository in the current directory.
    ///
    /// # Errors
    /// Returns `RepositoryNotInitialized` if there is none.
    pub fn open_current() -> Result<Self> {
        Self::open(env::current_dir()?)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn store(&self) -> &FsStore {
        &self.store
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) const fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub(crate) const fn state(&self) -> &State {
        &self.state
    }

    /// Branch pointers and the current branch.
    ///
    /// # Errors
    /// Returns error if the refs file cannot be read.
    pub fn refs(&self) -> Result<Refs> {
        self.state.load_refs()
    }

    /// The commit Head points at.
    ///
    /// # Errors
    /// Returns error if state or the commit cannot be read.
    pub fn head_commit(&self) -> Result<Commit> {
        let head = self.refs()?.head()?;
        Ok(self.store.commit(&head)?)
    }

    // === Staging ===

    /// Stage the working copy of `file`.
    ///
    /// # Errors
    /// Returns `InvalidFileName` or `FileNotFound`.
    pub fn add(&self, file: &str) -> Result<()> {
        Worktree::validate_name(file)?;
        let blob = self.worktree.read(file)?;
        let head = self.head_commit()?;
        let mut staging = self.state.load_staging()?;

        staging.add(file, blob, &head);
        self.state.save_staging(&staging)
    }

    /// Unstage `file`, and if Head tracks it, stage its removal and delete
    /// the working copy.
    ///
    /// # Errors
    /// Returns `NothingToRemove` if the file is neither staged nor tracked.
    pub fn rm(&self, file: &str) -> Result<()> {
        Worktree::validate_name(file)?;
        let head = self.head_commit()?;
        let mut staging = self.state.load_staging()?;

        if staging.remove(file, &head)? {
            self.worktree.remove(file)?;
        }
        self.state.save_staging(&staging)
    }

    /// Record the staged changes as a new commit on the current branch.
    ///
    /// # Errors
    /// Returns `EmptyCommitMessage` or `NoChangesStaged`.
    pub fn commit(&self, message: &str) -> Result<Commit> {
        if message.trim().is_empty() {
            return Err(Error::EmptyCommitMessage);
        }
        let mut refs = self.refs()?;
        let mut staging = self.state.load_staging()?;
        self.commit_staged(&mut refs, &mut staging, message, Utc::now(), None)
    }

    /// Build a commit from Head plus `staging`, store it, move the current
    /// branch to it and clear the staging index.
    fn commit_staged(
        &self,
        refs: &mut Refs,
        staging: &mut Staging,
        message: &str,
        timestamp: DateTime<Utc>,
        parent2: Option<ObjectId>,
    ) -> Result<Commit> {
        let head = self.store.commit(&refs.head()?)?;
        let files = match staging.snapshot_for_commit(&head, &self.store) {
            Err(Error::NoChangesStaged) if parent2.is_some() => head.files().clone(),
            other => other?,
        };

        let commit = Commit::new(message, timestamp, files, Some(head.id()), parent2)?;
        self.store.put_commit(&commit)?;

        staging.clear();
        self.state.save_staging(staging)?;
        refs.move_head(commit.id());
        self.state.save_refs(refs)?;

        info!(
            commit = %commit.id().short(),
            branch = %refs.current(),
            files = commit.files().len(),
            "created commit"
        );
        Ok(commit)
    }

    // === History ===

    /// First-parent history from Head, newest first.
    ///
    /// # Errors
    /// Returns error if a commit cannot be read.
    pub fn log(&self) -> Result<Vec<Commit>> {
        let head = self.refs()?.head()?;
        graph::first_parent(&self.store, head).collect()
    }

    /// Every stored commit, in id order.
    ///
    /// # Errors
    /// Returns error if a commit cannot be read.
    pub fn global_log(&self) -> Result<Vec<Commit>> {
        self.store
            .commit_ids()?
            .iter()
            .map(|id| self.store.commit(id).map_err(Error::from))
            .collect()
    }

    /// Ids of all commits whose message is exactly `message`.
    ///
    /// # Errors
    /// Returns `NoCommitWithMessage` if there are none.
    pub fn find(&self, message: &str) -> Result<Vec<ObjectId>> {
        let ids: Vec<ObjectId> = self
            .global_log()?
            .iter()
            .filter(|commit| commit.message() == message)
            .map(Commit::id)
            .collect();
        if ids.is_empty() {
            return Err(Error::NoCommitWithMessage(message.to_string()));
        }
        Ok(ids)
    }

    /// Resolve an abbreviated commit id.
    ///
    /// # Errors
    /// Returns the store's `AmbiguousOrMissingId` error.
    pub fn resolve(&self, prefix: &str) -> Result<ObjectId> {
        Ok(self.store.resolve_commit(prefix)?)
    }

    /// Branches, staging and working tree differences.
    ///
    /// # Errors
    /// Returns error if state or the working tree cannot be read.
    pub fn status(&self) -> Result<StatusReport> {
        let refs = self.refs()?;
        let head = self.store.commit(&refs.head()?)?;
        let staging = self.state.load_staging()?;
        StatusReport::compute(&refs, &head, &staging, &self.worktree)
    }

    // === Checkout ===

    /// Restore `file` from Head without staging it.
    ///
    /// # Errors
    /// Returns `FileNotInCommit` if Head does not track it.
    pub fn checkout_file(&self, file: &str) -> Result<()> {
        let head = self.head_commit()?;
        self.restore_file(&head, file)
    }

    /// Restore `file` from the commit `prefix` resolves to, without staging.
    ///
    /// # Errors
    /// Returns `AmbiguousOrMissingId` or `FileNotInCommit`.
    pub fn checkout_file_at(&self, prefix: &str, file: &str) -> Result<()> {
        let id = self.resolve(prefix)?;
        let commit = self.store.commit(&id)?;
        self.restore_file(&commit, file)
    }

    fn restore_file(&self, commit: &Commit, file: &str) -> Result<()> {
        Worktree::validate_name(file)?;
        let id = commit
            .blob_for(file)
            .ok_or_else(|| Error::FileNotInCommit(file.to_string()))?;
        let blob = self.store.blob(&id)?;
        self.worktree.write(file, blob.content())
    }

    /// Switch to branch `name`, replacing the working tree with its head.
    ///
    /// # Errors
    /// Returns `BranchNotFound`, `CheckoutCurrentBranch` or
    /// `UntrackedFileConflict`.
    pub fn checkout_branch(&self, name: &str) -> Result<()> {
        let mut refs = self.refs()?;
        let target = refs
            .get(name)
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))?;
        if refs.current() == name {
            return Err(Error::CheckoutCurrentBranch);
        }

        self.switch_to(&refs, target, true)?;
        refs.switch_to(name)?;
        self.state.save_refs(&refs)?;
        info!(branch = name, "checked out branch");
        Ok(())
    }

    /// Move the current branch to the commit `prefix` resolves to.
    ///
    /// # Errors
    /// Returns `AmbiguousOrMissingId` or `UntrackedFileConflict`.
    pub fn reset(&self, prefix: &str) -> Result<ObjectId> {
        let id = self.resolve(prefix)?;
        let mut refs = self.refs()?;
        self.switch_to(&refs, id, true)?;
        refs.move_head(id);
        self.state.save_refs(&refs)?;
        info!(commit = %id.short(), branch = %refs.current(), "reset branch");
        Ok(id)
    }

    /// Replace the working tree with `target`'s snapshot and clear staging.
    /// Branch pointers are untouched; the caller moves whichever one now
    /// names `target` and saves the refs.
    pub(crate) fn switch_to(
        &self,
        refs: &Refs,
        target: ObjectId,
        check_untracked: bool,
    ) -> Result<()> {
        let head = self.store.commit(&refs.head()?)?;
        let target = self.store.commit(&target)?;
        let mut staging = self.state.load_staging()?;

        if check_untracked {
            self.worktree.ensure_not_untracked(
                target.files().keys().map(String::as_str),
                &head,
                &staging,
            )?;
        }

        for (name, id) in target.files() {
            let blob = self.store.blob(id)?;
            self.worktree.write(name, blob.content())?;
        }
        for name in head.files().keys() {
            if !target.tracks(name) {
                self.worktree.remove(name)?;
            }
        }

        staging.clear();
        self.state.save_staging(&staging)?;
        debug!(from = %head.id().short(), to = %target.id().short(), "switched working tree");
        Ok(())
    }

    // === Branches ===

    /// Create branch `name` at Head.
    ///
    /// # Errors
    /// Returns `InvalidBranchName` or `BranchExists`.
    pub fn branch(&self, name: &str) -> Result<()> {
        let name = BranchName::new(name)?;
        let mut refs = self.refs()?;
        let head = refs.head()?;
        refs.create(name.clone(), head)?;
        self.state.save_refs(&refs)?;
        debug!(branch = %name, at = %head.short(), "created branch");
        Ok(())
    }

    /// Delete branch `name`. Commits are kept.
    ///
    /// # Errors
    /// Returns `BranchNotFound` or `CannotRemoveCurrentBranch`.
    pub fn remove_branch(&self, name: &str) -> Result<()> {
        let mut refs = self.refs()?;
        refs.remove(name)?;
        self.state.save_refs(&refs)?;
        debug!(branch = name, "removed branch");
        Ok(())
    }

    // === Merge ===

    /// Merge branch `name` into the current branch.
    ///
    /// # Errors
    /// Returns `UncommittedChangesPresentForMerge`, `BranchNotFound`,
    /// `MergeSelf`, `AncestorBranch` or `UntrackedFileConflict`.
    pub fn merge(&self, name: &str) -> Result<MergeOutcome> {
        let mut refs = self.refs()?;
        let mut staging = self.state.load_staging()?;
        if !staging.is_empty() {
            return Err(Error::UncommittedChangesPresentForMerge);
        }
        let other_id = refs
            .get(name)
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))?;
        if refs.current() == name {
            return Err(Error::MergeSelf);
        }

        let head_id = refs.head()?;
        let split = graph::split_point(&self.store, head_id, other_id)?;
        if split == Some(other_id) {
            return Err(Error::AncestorBranch);
        }
        if split == Some(head_id) {
            self.switch_to(&refs, other_id, true)?;
            refs.move_head(other_id);
            self.state.save_refs(&refs)?;
            info!(branch = %refs.current(), to = %other_id.short(), "fast-forwarded");
            return Ok(MergeOutcome::FastForward(other_id));
        }

        let head = self.store.commit(&head_id)?;
        let other = self.store.commit(&other_id)?;
        let split = split.map(|id| self.store.commit(&id)).transpose()?;
        let plan = MergePlan::new(split.as_ref(), &head, &other);
        self.worktree
            .ensure_not_untracked(plan.touched_files(), &head, &staging)?;

        let conflicts = plan.apply(&self.store, &self.worktree, &mut staging, &head)?;
        let message = format!("Merged {name} into {}.", refs.current());
        let commit =
            self.commit_staged(&mut refs, &mut staging, &message, Utc::now(), Some(other_id))?;

        info!(
            commit = %commit.id().short(),
            branch = name,
            conflicts = conflicts.len(),
            "merged branch"
        );
        Ok(MergeOutcome::Merged {
            commit: commit.id(),
            conflicts,
        })
    }
}
