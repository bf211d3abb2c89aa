//! State persistence for the `.twig/` directory.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use twig_store::{Blob, ObjectId, write_atomic};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::refs::Refs;
use crate::staging::Staging;

/// Manages the files under `.twig/`, except the object store itself.
#[derive(Debug, Clone)]
pub struct State {
    /// Path to the `.twig/` directory.
    twig_dir: PathBuf,
}

/// On-disk form of the staging index. Content lives under `staging/`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    #[serde(default)]
    add: BTreeMap<String, ObjectId>,
    #[serde(default)]
    remove: BTreeSet<String>,
}

impl State {
    /// Name of the metadata directory inside a working tree.
    pub const DIR_NAME: &'static str = ".twig";

    const REFS_FILE: &'static str = "refs.json";
    const INDEX_FILE: &'static str = "index.json";
    const CONFIG_FILE: &'static str = "config.toml";
    const STAGING_DIR: &'static str = "staging";
    const OBJECTS_DIR: &'static str = "objects";

    /// State for the repository whose working tree is `root`.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            twig_dir: root.as_ref().join(Self::DIR_NAME),
        }
    }

    /// Create the directory structure and the first refs, index and config.
    ///
    /// # Errors
    /// Returns `RepositoryAlreadyExists`, or an IO error.
    pub fn init(&self, refs: &Refs, config: &Config) -> Result<()> {
        if self.twig_dir.exists() {
            return Err(Error::RepositoryAlreadyExists);
        }

        fs::create_dir_all(self.twig_dir.join(Self::STAGING_DIR))?;
        fs::create_dir_all(self.objects_dir())?;
        config.save(self.config_path())?;
        self.save_staging(&Staging::new())?;
        self.save_refs(refs)?;
        Ok(())
    }

    /// Check if a repository is initialized here.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.twig_dir.is_dir() && self.refs_path().is_file()
    }

    #[must_use]
    pub fn twig_dir(&self) -> &Path {
        &self.twig_dir
    }

    /// Directory holding the object store.
    #[must_use]
    pub fn objects_dir(&self) -> PathBuf {
        self.twig_dir.join(Self::OBJECTS_DIR)
    }

    // === Config ===

    fn config_path(&self) -> PathBuf {
        self.twig_dir.join(Self::CONFIG_FILE)
    }

    /// Load `config.toml`, falling back to defaults if it is absent.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.config_path())
    }

    /// Save `config.toml`.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save_config(&self, config: &Config) -> Result<()> {
        config.save(self.config_path())
    }

    // === Refs ===

    fn refs_path(&self) -> PathBuf {
        self.twig_dir.join(Self::REFS_FILE)
    }

    /// Load branch pointers and the current branch.
    ///
    /// # Errors
    /// Returns `RepositoryNotInitialized`, or `StateParseError` if the file
    /// is malformed or names a current branch that has no pointer.
    pub fn load_refs(&self) -> Result<Refs> {
        let refs: Refs = self.read_json(&self.refs_path())?;
        if refs.head().is_err() {
            return Err(Error::StateParseError {
                file: self.refs_path(),
                message: format!("current branch '{}' has no pointer", refs.current()),
            });
        }
        Ok(refs)
    }

    /// Save branch pointers and the current branch in one write.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save_refs(&self, refs: &Refs) -> Result<()> {
        let content = serde_json::to_string_pretty(refs)?;
        write_atomic(&self.refs_path(), content.as_bytes())?;
        debug!(current = %refs.current(), "saved refs");
        Ok(())
    }

    // === Staging index ===

    fn index_path(&self) -> PathBuf {
        self.twig_dir.join(Self::INDEX_FILE)
    }

    fn staging_dir(&self) -> PathBuf {
        self.twig_dir.join(Self::STAGING_DIR)
    }

    /// Load the staging index together with the staged content.
    ///
    /// # Errors
    /// Returns `StateParseError` if the index is malformed or staged content
    /// is missing or does not match its id.
    pub fn load_staging(&self) -> Result<Staging> {
        let index: IndexFile = self.read_json(&self.index_path())?;

        let mut add = BTreeMap::new();
        for (name, id) in index.add {
            let path = self.staging_dir().join(id.to_hex());
            let blob = Blob::new(fs::read(&path).map_err(|e| Error::StateParseError {
                file: path.clone(),
                message: format!("staged content for '{name}' unreadable: {e}"),
            })?);
            if blob.id() != id {
                return Err(Error::StateParseError {
                    file: path,
                    message: format!("staged content for '{name}' does not match its id"),
                });
            }
            add.insert(name, blob);
        }

        Ok(Staging::from_parts(add, index.remove))
    }

    /// Save the staging index, writing staged content under `staging/` and
    /// pruning content no entry refers to any more.
    ///
    /// # Errors
    /// Returns error if serialization or a write fails.
    pub fn save_staging(&self, staging: &Staging) -> Result<()> {
        let dir = self.staging_dir();
        let mut keep = BTreeSet::new();
        for blob in staging.added().values() {
            let name = blob.id().to_hex();
            let path = dir.join(&name);
            if !path.exists() {
                write_atomic(&path, blob.content())?;
            }
            keep.insert(name);
        }

        let index = IndexFile {
            add: staging
                .added()
                .iter()
                .map(|(name, blob)| (name.clone(), blob.id()))
                .collect(),
            remove: staging.removed().clone(),
        };
        let content = serde_json::to_string_pretty(&index)?;
        write_atomic(&self.index_path(), content.as_bytes())?;

        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let stale = entry
                .file_name()
                .to_str()
                .is_none_or(|name| !keep.contains(name));
            if stale {
                if let Err(e) = fs::remove_file(entry.path()) {
                    warn!(path = %entry.path().display(), error = %e, "could not prune staged content");
                }
            }
        }
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound && !self.twig_dir.is_dir() => {
                return Err(Error::RepositoryNotInitialized);
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map_err(|e| Error::StateParseError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
