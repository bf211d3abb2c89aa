//! Branch name validation and newtype.
//!
//! Provides a [`BranchName`] type used as the key of every branch pointer,
//! including the `remote/branch` names that fetch records.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Characters that may never appear in a branch name.
const FORBIDDEN: &[char] = &[
    ' ', '~', '^', ':', '?', '*', '[', '\\', '$', ';', '|', '&', '>', '<', '`', '"', '\'', '(',
    ')', '{', '}', '!',
];

/// Sequences that may never appear in a branch name.
const FORBIDDEN_SEQUENCES: &[&str] = &["..", "//", "/.", "@{"];

/// A validated branch name.
///
/// # Examples
///
/// ```
/// use twig_core::BranchName;
///
/// let name = BranchName::new("feature-x").unwrap();
/// let tracking = BranchName::tracking("origin", &name).unwrap();
/// assert_eq!(tracking.as_str(), "origin/feature-x");
/// assert_eq!(tracking.remote_parts(), Some(("origin", "feature-x")));
///
/// assert!(BranchName::new("../escape").is_err());
/// assert!(BranchName::new("bad name").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBranchName`] if the name is empty, contains
    /// whitespace, control or shell characters, or a forbidden sequence.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        validate_branch_name(&name)?;
        Ok(Self(name))
    }

    /// The local name under which a fetched remote branch is tracked.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBranchName`] if the combined name is invalid.
    pub fn tracking(remote: &str, branch: &str) -> Result<Self, Error> {
        Self::new(format!("{remote}/{branch}"))
    }

    /// Split a tracking name into `(remote, branch)`.
    #[must_use]
    pub fn remote_parts(&self) -> Option<(&str, &str)> {
        self.0.split_once('/')
    }

    /// Get the branch name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the `BranchName` and return the inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for BranchName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::borrow::Borrow<str> for BranchName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for BranchName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BranchName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for BranchName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BranchName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

fn validate_branch_name(name: &str) -> Result<(), Error> {
    let invalid = |reason: String| Error::InvalidBranchName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("branch name cannot be empty".into()));
    }
    if name == "@" {
        return Err(invalid("branch name cannot be '@'".into()));
    }
    if name.starts_with(['.', '/', '-']) || name.ends_with(['.', '/']) {
        return Err(invalid(
            "branch name cannot start with '.', '/' or '-', or end with '.' or '/'".into(),
        ));
    }
    #[allow(clippy::case_sensitive_file_extension_comparisons)]
    if name.ends_with(".lock") {
        return Err(invalid("branch name cannot end with '.lock'".into()));
    }
    if let Some(c) = name.chars().find(|c| c.is_control()) {
        return Err(invalid(format!(
            "branch name cannot contain control character {c:?}"
        )));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN.contains(c)) {
        return Err(invalid(format!("branch name cannot contain '{c}'")));
    }
    if let Some(seq) = FORBIDDEN_SEQUENCES.iter().find(|seq| name.contains(*seq)) {
        return Err(invalid(format!("branch name cannot contain '{seq}'")));
    }

    Ok(())
}
