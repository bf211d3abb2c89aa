//! Three-way merge: per-file classification and its application.
//!
//! Each file name in the union of the split point's, the current head's and
//! the other head's snapshots is classified by comparing its three versions
//! (absence counts as a version). The result is a [`MergePlan`] that is
//! applied to the working tree and staging index in one pass.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;
use twig_store::{Blob, Commit, ObjectId, ObjectStore};

use crate::error::Result;
use crate::staging::Staging;
use crate::worktree::Worktree;

const CONFLICT_START: &[u8] = b"<<<<<<< HEAD\n";
const CONFLICT_SEPARATOR: &[u8] = b"=======\n";
const CONFLICT_END: &[u8] = b">>>>>>>\n";

/// What a merge does to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    /// Keep the current version; nothing to do.
    Unchanged,
    /// Only the other branch changed the file: check out its version, or
    /// delete the file when the other branch removed it.
    TakeOther(Option<ObjectId>),
    /// Both sides changed the file differently.
    Conflict {
        current: Option<ObjectId>,
        other: Option<ObjectId>,
    },
}

/// Classify one file from its versions at the split point, the current head
/// and the other head.
#[must_use]
pub fn classify(
    split: Option<ObjectId>,
    current: Option<ObjectId>,
    other: Option<ObjectId>,
) -> MergeAction {
    let current_is_split = current == split;
    let current_is_other = current == other;
    let split_is_other = split == other;

    match (current_is_split, current_is_other, split_is_other) {
        (true, false, _) => MergeAction::TakeOther(other),
        (false, false, false) => MergeAction::Conflict { current, other },
        _ => MergeAction::Unchanged,
    }
}

/// Contents written to a conflicted file.
///
/// A non-empty side without a trailing newline gets one, so each marker
/// starts its own line.
#[must_use]
pub fn conflict_text(current: &[u8], other: &[u8]) -> Vec<u8> {
    let mut text = Vec::with_capacity(
        CONFLICT_START.len()
            + current.len()
            + CONFLICT_SEPARATOR.len()
            + other.len()
            + CONFLICT_END.len()
            + 2,
    );
    text.extend_from_slice(CONFLICT_START);
    push_line_terminated(&mut text, current);
    text.extend_from_slice(CONFLICT_SEPARATOR);
    push_line_terminated(&mut text, other);
    text.extend_from_slice(CONFLICT_END);
    text
}

fn push_line_terminated(text: &mut Vec<u8>, side: &[u8]) {
    text.extend_from_slice(side);
    if side.last().is_some_and(|&b| b != b'\n') {
        text.push(b'\n');
    }
}

/// The non-trivial actions of one merge, by file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    actions: BTreeMap<String, MergeAction>,
}

impl MergePlan {
    /// Classify every file of the three snapshots. `split` is `None` when the
    /// heads share no history, which behaves like an empty snapshot.
    #[must_use]
    pub fn new(split: Option<&Commit>, current: &Commit, other: &Commit) -> Self {
        let empty = BTreeMap::new();
        let split_files = split.map_or(&empty, Commit::files);

        let names: BTreeSet<&String> = split_files
            .keys()
            .chain(current.files().keys())
            .chain(other.files().keys())
            .collect();

        let actions = names
            .into_iter()
            .filter_map(|name| {
                let action = classify(
                    split_files.get(name).copied(),
                    current.blob_for(name),
                    other.blob_for(name),
                );
                (action != MergeAction::Unchanged).then(|| (name.clone(), action))
            })
            .collect();

        Self { actions }
    }

    /// Actions in file name order; unchanged files are omitted.
    pub fn actions(&self) -> impl Iterator<Item = (&str, MergeAction)> {
        self.actions.iter().map(|(name, action)| (name.as_str(), *action))
    }

    /// Files the merge writes or deletes.
    pub fn touched_files(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    /// Files that will be written with conflict markers.
    pub fn conflicts(&self) -> impl Iterator<Item = &str> {
        self.actions
            .iter()
            .filter(|(_, action)| matches!(action, MergeAction::Conflict { .. }))
            .map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn has_conflicts(&self) -> bool {
        self.conflicts().next().is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Write every action to the working tree and stage it against `head`.
    ///
    /// Returns the names of conflicted files.
    ///
    /// # Errors
    /// Returns error if a blob is missing or a working file cannot be written.
    pub fn apply<S>(
        &self,
        store: &S,
        worktree: &Worktree,
        staging: &mut Staging,
        head: &Commit,
    ) -> Result<Vec<String>>
    where
        S: ObjectStore + ?Sized,
    {
        let mut conflicts = Vec::new();
        for (name, action) in self.actions() {
            match action {
                MergeAction::Unchanged => {}
                MergeAction::TakeOther(Some(id)) => {
                    let blob = store.blob(&id)?;
                    worktree.write(name, blob.content())?;
                    staging.add(name, blob, head);
                }
                MergeAction::TakeOther(None) => {
                    worktree.remove(name)?;
                    staging.stage_removal(name);
                }
                MergeAction::Conflict { current, other } => {
                    let text = conflict_text(
                        &load_content(store, current)?,
                        &load_content(store, other)?,
                    );
                    worktree.write(name, &text)?;
                    staging.add(name, Blob::new(text), head);
                    conflicts.push(name.to_string());
                }
            }
            debug!(file = name, ?action, "applied merge action");
        }
        Ok(conflicts)
    }
}

fn load_content<S: ObjectStore + ?Sized>(store: &S, id: Option<ObjectId>) -> Result<Vec<u8>> {
    match id {
        Some(id) => Ok(store.blob(&id)?.into_content()),
        None => Ok(Vec::new()),
    }
}
