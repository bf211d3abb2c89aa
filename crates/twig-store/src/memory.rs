//! In-memory object store.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::hash::ObjectId;
use crate::object::{Blob, Commit, ObjectKind};
use crate::traits::ObjectStore;

/// An [`ObjectStore`] that keeps everything in memory.
///
/// Nothing is persisted. The unit and property tests use it as a stand-in
/// for [`FsStore`](crate::FsStore).
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RefCell<BTreeMap<ObjectId, Blob>>,
    commits: RefCell<BTreeMap<ObjectId, Commit>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored commits.
    #[must_use]
    pub fn commit_count(&self) -> usize {
        self.commits.borrow().len()
    }

    /// Number of stored blobs.
    #[must_use]
    pub fn blob_count(&self) -> usize {
        self.blobs.borrow().len()
    }
}

impl ObjectStore for MemoryStore {
    fn put_blob(&self, blob: &Blob) -> Result<ObjectId> {
        self.blobs
            .borrow_mut()
            .entry(blob.id())
            .or_insert_with(|| blob.clone());
        Ok(blob.id())
    }

    fn put_commit(&self, commit: &Commit) -> Result<ObjectId> {
        self.commits
            .borrow_mut()
            .entry(commit.id())
            .or_insert_with(|| commit.clone());
        Ok(commit.id())
    }

    fn blob(&self, id: &ObjectId) -> Result<Blob> {
        self.blobs
            .borrow()
            .get(id)
            .cloned()
            .ok_or(Error::ObjectNotFound {
                kind: ObjectKind::Blob,
                id: *id,
            })
    }

    fn commit(&self, id: &ObjectId) -> Result<Commit> {
        self.commits
            .borrow()
            .get(id)
            .cloned()
            .ok_or(Error::ObjectNotFound {
                kind: ObjectKind::Commit,
                id: *id,
            })
    }

    fn has_blob(&self, id: &ObjectId) -> bool {
        self.blobs.borrow().contains_key(id)
    }

    fn has_commit(&self, id: &ObjectId) -> bool {
        self.commits.borrow().contains_key(id)
    }

    fn commit_ids(&self) -> Result<Vec<ObjectId>> {
        Ok(self.commits.borrow().keys().copied().collect())
    }
}
