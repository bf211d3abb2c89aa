//! Filesystem-backed object store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::ObjectId;
use crate::object::{Blob, Commit, ObjectKind};
use crate::traits::ObjectStore;

/// Objects stored one file per object under `objects/commits/` and
/// `objects/blobs/`, named by hex id.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    const COMMITS_DIR: &'static str = "commits";
    const BLOBS_DIR: &'static str = "blobs";

    /// Open a store rooted at `root` (the `objects` directory).
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the directory structure.
    ///
    /// # Errors
    /// Returns error if directory creation fails.
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.root.join(Self::COMMITS_DIR))?;
        fs::create_dir_all(self.root.join(Self::BLOBS_DIR))?;
        Ok(())
    }

    /// Check whether the directory structure exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.root.join(Self::COMMITS_DIR).is_dir() && self.root.join(Self::BLOBS_DIR).is_dir()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, kind: ObjectKind, id: &ObjectId) -> PathBuf {
        let dir = match kind {
            ObjectKind::Blob => Self::BLOBS_DIR,
            ObjectKind::Commit => Self::COMMITS_DIR,
        };
        self.root.join(dir).join(id.to_hex())
    }

    fn read(&self, kind: ObjectKind, id: &ObjectId) -> Result<Vec<u8>> {
        match fs::read(self.path_for(kind, id)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(Error::ObjectNotFound { kind, id: *id })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, kind: ObjectKind, id: &ObjectId, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(kind, id);
        if path.exists() {
            return Ok(());
        }
        write_atomic(&path, bytes)?;
        debug!(%kind, id = %id.short(), bytes = bytes.len(), "stored object");
        Ok(())
    }
}

impl ObjectStore for FsStore {
    fn put_blob(&self, blob: &Blob) -> Result<ObjectId> {
        self.write(ObjectKind::Blob, &blob.id(), blob.content())?;
        Ok(blob.id())
    }

    fn put_commit(&self, commit: &Commit) -> Result<ObjectId> {
        self.write(ObjectKind::Commit, &commit.id(), &commit.encode()?)?;
        Ok(commit.id())
    }

    fn blob(&self, id: &ObjectId) -> Result<Blob> {
        let blob = Blob::new(self.read(ObjectKind::Blob, id)?);
        if blob.id() != *id {
            return Err(Error::CorruptObject {
                id: *id,
                reason: format!("content hashes to {}", blob.id()),
            });
        }
        Ok(blob)
    }

    fn commit(&self, id: &ObjectId) -> Result<Commit> {
        let bytes = self.read(ObjectKind::Commit, id)?;
        let commit = Commit::decode(&bytes).map_err(|e| match e {
            Error::Json(json) => Error::CorruptObject {
                id: *id,
                reason: json.to_string(),
            },
            other => other,
        })?;
        if commit.id() != *id {
            return Err(Error::CorruptObject {
                id: *id,
                reason: format!("content hashes to {}", commit.id()),
            });
        }
        Ok(commit)
    }

    fn has_blob(&self, id: &ObjectId) -> bool {
        self.path_for(ObjectKind::Blob, id).is_file()
    }

    fn has_commit(&self, id: &ObjectId) -> bool {
        self.path_for(ObjectKind::Commit, id).is_file()
    }

    fn commit_ids(&self) -> Result<Vec<ObjectId>> {
        let mut ids: Vec<ObjectId> = fs::read_dir(self.root.join(Self::COMMITS_DIR))?
            .filter_map(std::result::Result::ok)
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().to_str().and_then(|n| ObjectId::from_hex(n).ok()))
            .collect();
        ids.sort();
        Ok(ids)
    }
}

/// Write `bytes` to `path` through a sibling temp file and a rename, so
/// readers never observe a partially written file.
///
/// # Errors
/// Returns error if the temp file cannot be written or renamed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}
