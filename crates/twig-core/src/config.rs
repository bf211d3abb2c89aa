//! Configuration management for twig.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Repository configuration loaded from `.twig/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Commit display settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Registered remotes, by name.
    #[serde(default)]
    pub remotes: BTreeMap<String, RemoteConfig>,
}

impl Config {
    /// Load config from a TOML file.
    ///
    /// # Errors
    /// Returns error if file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a TOML file.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| std::io::Error::other(e.to_string()))?;
        twig_store::write_atomic(path.as_ref(), content.as_bytes())?;
        Ok(())
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Branch created by `init`.
    #[serde(default = "default_branch")]
    pub default_branch: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
        }
    }
}

fn default_branch() -> String {
    "master".into()
}

/// Commit display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// chrono format string for the `Date:` line.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
        }
    }
}

fn default_date_format() -> String {
    "%a %b %-d %H:%M:%S %Y %z".into()
}

/// A registered remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Root directory of the remote repository.
    pub path: PathBuf,
}
