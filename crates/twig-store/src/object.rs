//! Immutable stored objects: file blobs and commits.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::ObjectId;

/// The two kinds of stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Blob,
    Commit,
}

impl ObjectKind {
    /// Tag mixed into the digest of every object of this kind.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Commit => "commit",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// File contents at one point in time.
#[derive(Clone)]
pub struct Blob {
    id: ObjectId,
    content: Vec<u8>,
}

impl Blob {
    /// Wrap `content`, computing its id.
    #[must_use]
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        let id = ObjectId::digest(ObjectKind::Blob.tag(), &content);
        Self { id, content }
    }

    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    #[must_use]
    pub fn into_content(self) -> Vec<u8> {
        self.content
    }
}

impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Blob {}

impl Hash for Blob {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("id", &self.id)
            .field("len", &self.content.len())
            .finish()
    }
}

/// The hashed content of a commit. Field order is the serialization order.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CommitData {
    message: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    timestamp: DateTime<Utc>,
    files: BTreeMap<String, ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent1: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent2: Option<ObjectId>,
}

/// A snapshot of the tracked files plus its place in history.
///
/// The id is computed once, from the canonical encoding of message,
/// timestamp, snapshot and parent ids. Equality and hashing use only the
/// id, so a commit reloaded from disk equals the one that was written.
#[derive(Clone)]
pub struct Commit {
    id: ObjectId,
    data: CommitData,
}

impl Commit {
    /// Build a commit and compute its id.
    ///
    /// Timestamps are stored at one-second resolution; sub-second parts are
    /// dropped before hashing.
    ///
    /// # Errors
    /// Returns error if the commit cannot be encoded.
    pub fn new(
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
        files: BTreeMap<String, ObjectId>,
        parent1: Option<ObjectId>,
        parent2: Option<ObjectId>,
    ) -> Result<Self> {
        let timestamp = DateTime::from_timestamp(timestamp.timestamp(), 0).unwrap_or(timestamp);
        let data = CommitData {
            message: message.into(),
            timestamp,
            files,
            parent1,
            parent2,
        };
        let encoded = serde_json::to_vec(&data)?;
        let id = ObjectId::digest(ObjectKind::Commit.tag(), &encoded);
        Ok(Self { id, data })
    }

    /// The parentless commit every repository starts from.
    ///
    /// # Errors
    /// Returns error if the commit cannot be encoded.
    pub fn initial() -> Result<Self> {
        Self::new(
            "initial commit",
            DateTime::<Utc>::UNIX_EPOCH,
            BTreeMap::new(),
            None,
            None,
        )
    }

    /// Canonical bytes; these are exactly what the id is computed over.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.data)?)
    }

    /// Decode canonical bytes, recomputing the id.
    ///
    /// # Errors
    /// Returns error if the bytes are not a valid commit encoding.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let data: CommitData = serde_json::from_slice(bytes)?;
        let id = ObjectId::digest(ObjectKind::Commit.tag(), bytes);
        let commit = Self { id, data };

        // Non-canonical input (whitespace, reordered keys) would yield an id
        // that differs from the one a fresh encoding produces.
        if commit.encode()? != bytes {
            return Err(Error::CorruptObject {
                id,
                reason: "commit bytes are not in canonical form".into(),
            });
        }
        Ok(commit)
    }

    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.data.message
    }

    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.data.timestamp
    }

    /// Tracked file name to blob id, in lexicographic order.
    #[must_use]
    pub const fn files(&self) -> &BTreeMap<String, ObjectId> {
        &self.data.files
    }

    /// Blob id recorded for `name`, if tracked.
    #[must_use]
    pub fn blob_for(&self, name: &str) -> Option<ObjectId> {
        self.data.files.get(name).copied()
    }

    #[must_use]
    pub fn tracks(&self, name: &str) -> bool {
        self.data.files.contains_key(name)
    }

    #[must_use]
    pub const fn parent1(&self) -> Option<ObjectId> {
        self.data.parent1
    }

    #[must_use]
    pub const fn parent2(&self) -> Option<ObjectId> {
        self.data.parent2
    }

    /// Parent ids, first parent first.
    pub fn parents(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.data.parent1.into_iter().chain(self.data.parent2)
    }

    #[must_use]
    pub const fn is_merge(&self) -> bool {
        self.data.parent2.is_some()
    }
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Commit {}

impl Hash for Commit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commit")
            .field("id", &self.id)
            .field("message", &self.data.message)
            .field("parent1", &self.data.parent1)
            .field("parent2", &self.data.parent2)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn files(pairs: &[(&str, &str)]) -> BTreeMap<String, ObjectId> {
        pairs
            .iter()
            .map(|(name, content)| ((*name).to_string(), Blob::new(*content).id()))
            .collect()
    }

    #[test]
    fn test_blob_identity_is_content() {
        assert_eq!(Blob::new("x"), Blob::new("x"));
        assert_ne!(Blob::new("x").id(), Blob::new("y").id());
    }

    #[test]
    fn test_commit_hash_is_deterministic() {
        let a = Commit::new("c1", at(1000), files(&[("a.txt", "x")]), None, None).unwrap();
        let b = Commit::new("c1", at(1000), files(&[("a.txt", "x")]), None, None).unwrap();
        assert_eq!(a.id(), b.id());
        assert_eq!(a, b);
    }

    #[test]
    fn test_commit_hash_covers_every_field() {
        let base = Commit::new("m", at(5), files(&[("f", "1")]), None, None).unwrap();
        let parent = base.id();

        let variants = [
            Commit::new("other", at(5), files(&[("f", "1")]), None, None).unwrap(),
            Commit::new("m", at(6), files(&[("f", "1")]), None, None).unwrap(),
            Commit::new("m", at(5), files(&[("f", "2")]), None, None).unwrap(),
            Commit::new("m", at(5), files(&[("f", "1")]), Some(parent), None).unwrap(),
            Commit::new("m", at(5), files(&[("f", "1")]), None, Some(parent)).unwrap(),
        ];
        for variant in &variants {
            assert_ne!(variant.id(), base.id());
        }
    }

    #[test]
    fn test_subsecond_precision_is_dropped() {
        let whole = Commit::new("m", at(42), BTreeMap::new(), None, None).unwrap();
        let fractional = Commit::new(
            "m",
            Utc.timestamp_opt(42, 500_000_000).unwrap(),
            BTreeMap::new(),
            None,
            None,
        )
        .unwrap();
        assert_eq!(whole.id(), fractional.id());
    }

    #[test]
    fn test_encode_decode_preserves_identity() {
        let parent = Commit::initial().unwrap();
        let commit = Commit::new(
            "merge",
            at(77),
            files(&[("b", "2"), ("a", "1")]),
            Some(parent.id()),
            Some(parent.id()),
        )
        .unwrap();

        let decoded = Commit::decode(&commit.encode().unwrap()).unwrap();
        assert_eq!(decoded, commit);
        assert_eq!(decoded.message(), "merge");
        assert_eq!(decoded.timestamp(), at(77));
        assert_eq!(decoded.files().keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(decoded.is_merge());
        assert_eq!(decoded.parents().count(), 2);
    }

    #[test]
    fn test_decode_rejects_non_canonical_bytes() {
        let commit = Commit::initial().unwrap();
        let mut pretty = serde_json::to_vec_pretty(&commit.data).unwrap();
        pretty.push(b'\n');
        assert!(matches!(
            Commit::decode(&pretty),
            Err(Error::CorruptObject { .. })
        ));
    }

    #[test]
    fn test_initial_commit_is_shared() {
        assert_eq!(Commit::initial().unwrap(), Commit::initial().unwrap());
        assert_eq!(Commit::initial().unwrap().timestamp().timestamp(), 0);
    }
}
