//! The staging index: pending additions and removals against Head.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;
use twig_store::{Blob, Commit, ObjectId, ObjectStore};

use crate::error::{Error, Result};

/// Pending changes for the next commit.
///
/// A file name is in at most one of the two stages at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Staging {
    add: BTreeMap<String, Blob>,
    remove: BTreeSet<String>,
}

impl Staging {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts. Names present in both stages keep only
    /// their add-stage entry.
    #[must_use]
    pub fn from_parts(add: BTreeMap<String, Blob>, remove: BTreeSet<String>) -> Self {
        let remove = remove
            .into_iter()
            .filter(|name| !add.contains_key(name))
            .collect();
        Self { add, remove }
    }

    /// Stage `blob` as the new content of `name`.
    ///
    /// If the content equals what `current` already records, any pending
    /// entry is dropped instead. Either way the name leaves the remove-stage.
    pub fn add(&mut self, name: &str, blob: Blob, current: &Commit) {
        self.remove.remove(name);
        if current.blob_for(name) == Some(blob.id()) {
            if self.add.remove(name).is_some() {
                debug!(file = name, "dropped stale stage entry");
            }
        } else {
            debug!(file = name, blob = %blob.id().short(), "staged for addition");
            self.add.insert(name.to_string(), blob);
        }
    }

    /// Unstage `name` and, if `current` tracks it, mark it for removal.
    ///
    /// Returns `true` when the file is tracked, in which case the caller
    /// deletes the working copy.
    ///
    /// # Errors
    /// Returns `NothingToRemove` if the file is neither staged nor tracked.
    pub fn remove(&mut self, name: &str, current: &Commit) -> Result<bool> {
        let unstaged = self.add.remove(name).is_some();
        let tracked = current.tracks(name);
        if tracked {
            self.stage_removal(name);
        } else if !unstaged {
            return Err(Error::NothingToRemove(name.to_string()));
        }
        Ok(tracked)
    }

    /// Mark `name` for removal, dropping any pending addition.
    pub fn stage_removal(&mut self, name: &str) {
        self.add.remove(name);
        debug!(file = name, "staged for removal");
        self.remove.insert(name.to_string());
    }

    /// Store every staged blob and return the snapshot for the next commit:
    /// `current`'s files with additions inserted and removals deleted.
    ///
    /// # Errors
    /// Returns `NoChangesStaged` if both stages are empty, or a store error.
    pub fn snapshot_for_commit<S>(
        &self,
        current: &Commit,
        store: &S,
    ) -> Result<BTreeMap<String, ObjectId>>
    where
        S: ObjectStore + ?Sized,
    {
        if self.is_empty() {
            return Err(Error::NoChangesStaged);
        }

        let mut files = current.files().clone();
        for (name, blob) in &self.add {
            files.insert(name.clone(), store.put_blob(blob)?);
        }
        for name in &self.remove {
            files.remove(name);
        }
        Ok(files)
    }

    /// Staged additions, by file name.
    #[must_use]
    pub const fn added(&self) -> &BTreeMap<String, Blob> {
        &self.add
    }

    /// Files staged for removal.
    #[must_use]
    pub const fn removed(&self) -> &BTreeSet<String> {
        &self.remove
    }

    #[must_use]
    pub fn staged_blob(&self, name: &str) -> Option<&Blob> {
        self.add.get(name)
    }

    #[must_use]
    pub fn is_removed(&self, name: &str) -> bool {
        self.remove.contains(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }

    pub fn clear(&mut self) {
        self.add.clear();
        self.remove.clear();
    }
}
