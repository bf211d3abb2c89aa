//! The working tree: regular files directly in the repository root.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use twig_store::{Blob, Commit};

use crate::error::{Error, Result};
use crate::staging::Staging;
use crate::state::State;

/// Working files of one repository.
#[derive(Debug, Clone)]
pub struct Worktree {
    root: PathBuf,
}

impl Worktree {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check that `name` is a plain file name in the repository root.
    ///
    /// # Errors
    /// Returns `InvalidFileName` for empty names, `.`/`..`, names containing
    /// a path separator, and the metadata directory.
    pub fn validate_name(name: &str) -> Result<()> {
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name == State::DIR_NAME
            || name.contains(['/', '\\', '\0']);
        if invalid {
            return Err(Error::InvalidFileName(name.to_string()));
        }
        Ok(())
    }

    /// Names of all regular files, sorted.
    ///
    /// # Errors
    /// Returns error if the directory cannot be listed.
    pub fn files(&self) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if name != State::DIR_NAME => {
                    names.insert(name);
                }
                Ok(_) => {}
                Err(raw) => warn!(name = ?raw, "skipping file with non-UTF-8 name"),
            }
        }
        Ok(names)
    }

    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.root.join(name).is_file()
    }

    /// Read a working file as a blob.
    ///
    /// # Errors
    /// Returns `FileNotFound` if the file is absent.
    pub fn read(&self, name: &str) -> Result<Blob> {
        match fs::read(self.root.join(name)) {
            Ok(bytes) => Ok(Blob::new(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(Error::FileNotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create or overwrite a working file.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn write(&self, name: &str, content: &[u8]) -> Result<()> {
        fs::write(self.root.join(name), content)?;
        debug!(file = name, bytes = content.len(), "wrote working file");
        Ok(())
    }

    /// Delete a working file. Deleting a missing file is not an error.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be removed.
    pub fn remove(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.root.join(name)) {
            Ok(()) => {
                debug!(file = name, "deleted working file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a working file exists that Head does not track and that is
    /// not staged for addition.
    #[must_use]
    pub fn is_untracked(&self, name: &str, head: &Commit, staging: &Staging) -> bool {
        self.exists(name) && !head.tracks(name) && staging.staged_blob(name).is_none()
    }

    /// Fail if any of `targets` names an untracked working file.
    ///
    /// # Errors
    /// Returns `UntrackedFileConflict` naming the first such file.
    pub fn ensure_not_untracked<'a>(
        &self,
        targets: impl IntoIterator<Item = &'a str>,
        head: &Commit,
        staging: &Staging,
    ) -> Result<()> {
        match targets
            .into_iter()
            .find(|name| self.is_untracked(name, head, staging))
        {
            Some(name) => Err(Error::UntrackedFileConflict(name.to_string())),
            None => Ok(()),
        }
    }
}
