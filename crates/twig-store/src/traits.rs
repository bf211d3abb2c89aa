//! Trait abstraction over object storage.
//!
//! This module defines the `ObjectStore` trait, which lets the commit graph,
//! the merge engine and remote transfer run against any store: the local
//! repository's, a remote repository's, or an in-memory one in tests.

use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::ObjectId;
use crate::object::{Blob, Commit};

/// Content-addressed storage of blobs and commits.
///
/// Writes are idempotent: putting an object that is already stored leaves
/// the store unchanged and returns the same id.
#[allow(clippy::missing_errors_doc)]
pub trait ObjectStore {
    /// Store a blob, returning its id.
    fn put_blob(&self, blob: &Blob) -> Result<ObjectId>;

    /// Store a commit, returning its id.
    fn put_commit(&self, commit: &Commit) -> Result<ObjectId>;

    /// Load a blob by id.
    fn blob(&self, id: &ObjectId) -> Result<Blob>;

    /// Load a commit by id.
    fn commit(&self, id: &ObjectId) -> Result<Commit>;

    /// Check whether a blob is stored.
    fn has_blob(&self, id: &ObjectId) -> bool;

    /// Check whether a commit is stored.
    fn has_commit(&self, id: &ObjectId) -> bool;

    /// Ids of every stored commit, sorted.
    fn commit_ids(&self) -> Result<Vec<ObjectId>>;

    /// Resolve an abbreviated commit id to the unique stored commit.
    ///
    /// Fails with `AmbiguousOrMissingId` unless exactly one commit matches.
    fn resolve_commit(&self, prefix: &str) -> Result<ObjectId> {
        if prefix.len() == ObjectId::HEX_LEN {
            if let Ok(id) = ObjectId::from_hex(prefix) {
                if self.has_commit(&id) {
                    return Ok(id);
                }
            }
        }

        let matches: Vec<ObjectId> = self
            .commit_ids()?
            .into_iter()
            .filter(|id| id.matches_prefix(prefix))
            .collect();

        match matches.as_slice() {
            [id] => Ok(*id),
            _ => Err(Error::AmbiguousOrMissingId {
                prefix: prefix.to_string(),
                matches: matches.len(),
            }),
        }
    }
}

/// Counts of objects written by a transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    pub commits: usize,
    pub blobs: usize,
}

impl std::ops::AddAssign for TransferStats {
    fn add_assign(&mut self, rhs: Self) {
        self.commits += rhs.commits;
        self.blobs += rhs.blobs;
    }
}

/// Copy one commit and every blob its snapshot references from `src` to
/// `dst`. Objects `dst` already holds are skipped.
///
/// # Errors
/// Returns error if an object is missing from `src` or a write fails.
pub fn transfer_commit<S, D>(src: &S, dst: &D, id: &ObjectId) -> Result<TransferStats>
where
    S: ObjectStore + ?Sized,
    D: ObjectStore + ?Sized,
{
    let mut stats = TransferStats::default();
    let commit = src.commit(id)?;

    for blob_id in commit.files().values() {
        if !dst.has_blob(blob_id) {
            dst.put_blob(&src.blob(blob_id)?)?;
            stats.blobs += 1;
        }
    }

    // Commit last, so a store never holds a commit whose blobs are missing.
    if !dst.has_commit(id) {
        dst.put_commit(&commit)?;
        stats.commits += 1;
    }

    debug!(commit = %id.short(), blobs = stats.blobs, "transferred commit");
    Ok(stats)
}
