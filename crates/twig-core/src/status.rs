//! Working tree status relative to Head and the staging index.

use serde::Serialize;
use twig_store::Commit;

use crate::error::Result;
use crate::refs::Refs;
use crate::staging::Staging;
use crate::worktree::Worktree;

/// How a file differs from what the next commit would record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Modified,
    Deleted,
}

impl ChangeKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        }
    }
}

/// A working file change that is not staged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnstagedChange {
    pub file: String,
    pub kind: ChangeKind,
}

/// Every section of `status`, each sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub current_branch: String,
    pub branches: Vec<String>,
    pub staged: Vec<String>,
    pub removed: Vec<String>,
    pub unstaged: Vec<UnstagedChange>,
    pub untracked: Vec<String>,
}

impl StatusReport {
    /// Compare the working tree against `head` and `staging`.
    ///
    /// # Errors
    /// Returns error if the working tree cannot be read.
    pub fn compute(
        refs: &Refs,
        head: &Commit,
        staging: &Staging,
        worktree: &Worktree,
    ) -> Result<Self> {
        let present = worktree.files()?;
        let mut unstaged = Vec::new();
        let mut untracked = Vec::new();

        let mut names: Vec<&str> = head
            .files()
            .keys()
            .chain(staging.added().keys())
            .chain(present.iter())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();

        for name in names {
            let exists = present.contains(name);
            let kind = if let Some(staged) = staging.staged_blob(name) {
                if !exists {
                    Some(ChangeKind::Deleted)
                } else if worktree.read(name)?.id() != staged.id() {
                    Some(ChangeKind::Modified)
                } else {
                    None
                }
            } else if let Some(committed) = head.blob_for(name) {
                if staging.is_removed(name) {
                    None
                } else if !exists {
                    Some(ChangeKind::Deleted)
                } else if worktree.read(name)?.id() != committed {
                    Some(ChangeKind::Modified)
                } else {
                    None
                }
            } else {
                None
            };

            if let Some(kind) = kind {
                unstaged.push(UnstagedChange {
                    file: name.to_string(),
                    kind,
                });
            }

            // A removed file that reappears counts as untracked.
            let untracked_here = exists
                && staging.staged_blob(name).is_none()
                && (!head.tracks(name) || staging.is_removed(name));
            if untracked_here {
                untracked.push(name.to_string());
            }
        }

        Ok(Self {
            current_branch: refs.current().to_string(),
            branches: refs.iter().map(|(name, _)| name.to_string()).collect(),
            staged: staging.added().keys().cloned().collect(),
            removed: staging.removed().iter().cloned().collect(),
            unstaged,
            untracked,
        })
    }

    /// Whether the working tree matches Head exactly.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.removed.is_empty()
            && self.unstaged.is_empty()
            && self.untracked.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use tempfile::TempDir;
    use twig_store::Blob;

    use super::*;
    use crate::branch_name::BranchName;

    fn change(file: &str, kind: ChangeKind) -> UnstagedChange {
        UnstagedChange {
            file: file.to_string(),
            kind,
        }
    }

    #[test]
    fn test_every_section() {
        let temp = TempDir::new().unwrap();
        let worktree = Worktree::new(temp.path());
        let tracked = ["same.txt", "edited.txt", "deleted.txt", "removed.txt", "revived.txt"];
        let head = Commit::new(
            "head",
            Utc::now(),
            tracked
                .iter()
                .map(|name| ((*name).to_string(), Blob::new("v1").id()))
                .collect::<BTreeMap<_, _>>(),
            None,
            None,
        )
        .unwrap();
        let mut refs = Refs::new(BranchName::new("master").unwrap(), head.id());
        refs.create(BranchName::new("b1").unwrap(), head.id()).unwrap();

        for name in ["same.txt", "removed.txt"] {
            worktree.write(name, b"v1").unwrap();
        }
        worktree.write("edited.txt", b"v2").unwrap();
        worktree.write("loose.txt", b"l").unwrap();
        worktree.write("staged.txt", b"s").unwrap();
        worktree.write("staged-edited.txt", b"s").unwrap();
        worktree.write("revived.txt", b"v1").unwrap();

        let mut staging = Staging::new();
        staging.add("staged.txt", Blob::new("s"), &head);
        staging.add("staged-edited.txt", Blob::new("s"), &head);
        staging.add("staged-gone.txt", Blob::new("g"), &head);
        staging.remove("removed.txt", &head).unwrap();
        staging.remove("revived.txt", &head).unwrap();
        worktree.remove("removed.txt").unwrap();
        worktree.write("staged-edited.txt", b"changed").unwrap();

        let report = StatusReport::compute(&refs, &head, &staging, &worktree).unwrap();

        assert_eq!(report.current_branch, "master");
        assert_eq!(report.branches, ["b1", "master"]);
        assert_eq!(report.staged, ["staged-edited.txt", "staged-gone.txt", "staged.txt"]);
        assert_eq!(report.removed, ["removed.txt", "revived.txt"]);
        assert_eq!(
            report.unstaged,
            [
                change("deleted.txt", ChangeKind::Deleted),
                change("edited.txt", ChangeKind::Modified),
                change("staged-edited.txt", ChangeKind::Modified),
                change("staged-gone.txt", ChangeKind::Deleted),
            ]
        );
        assert_eq!(report.untracked, ["loose.txt", "revived.txt"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_clean_tree() {
        let temp = TempDir::new().unwrap();
        let worktree = Worktree::new(temp.path());
        worktree.write("a.txt", b"a").unwrap();
        let head = Commit::new(
            "head",
            Utc::now(),
            BTreeMap::from([("a.txt".to_string(), Blob::new("a").id())]),
            None,
            None,
        )
        .unwrap();
        let refs = Refs::new(BranchName::new("master").unwrap(), head.id());

        let report = StatusReport::compute(&refs, &head, &Staging::new(), &worktree).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.branches, ["master"]);
    }
}
