//! Ancestry queries over the commit graph.
//!
//! Commits name their parents by id, so every step of a traversal is a
//! store lookup. Traversals are breadth-first, visit each commit once, and
//! expand first parents before second parents.
//!
//! # Split point policy
//!
//! [`split_point`] collects every ancestor of one commit, then walks the
//! other commit's history breadth-first and returns the first commit found
//! in that set. On histories with several merge bases this is not
//! necessarily the unique lowest common ancestor; the first-parent-first
//! tie-break is kept because it is deterministic.

use std::collections::{HashSet, VecDeque};

use twig_store::{Commit, ObjectId, ObjectStore};

use crate::error::Result;

/// Breadth-first walk over all ancestors of a commit, itself included.
pub struct Ancestors<'a, S: ?Sized> {
    store: &'a S,
    queue: VecDeque<ObjectId>,
    seen: HashSet<ObjectId>,
}

impl<S: ObjectStore + ?Sized> Iterator for Ancestors<'_, S> {
    type Item = Result<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.queue.pop_front()?;
        let commit = match self.store.commit(&id) {
            Ok(commit) => commit,
            Err(e) => {
                self.queue.clear();
                return Some(Err(e.into()));
            }
        };
        for parent in commit.parents() {
            if self.seen.insert(parent) {
                self.queue.push_back(parent);
            }
        }
        Some(Ok(commit))
    }
}

/// Walk every ancestor of `start` in breadth-first order.
pub fn ancestors<S: ObjectStore + ?Sized>(store: &S, start: ObjectId) -> Ancestors<'_, S> {
    Ancestors {
        store,
        queue: VecDeque::from([start]),
        seen: HashSet::from([start]),
    }
}

/// Ids of every ancestor of `start`, itself included.
///
/// # Errors
/// Returns error if a commit along the way is missing.
pub fn ancestor_ids<S: ObjectStore + ?Sized>(store: &S, start: ObjectId) -> Result<HashSet<ObjectId>> {
    ancestors(store, start)
        .map(|commit| commit.map(|c| c.id()))
        .collect()
}

/// The split point of `a` and `b`, or `None` if they share no history.
///
/// # Errors
/// Returns error if a commit along the way is missing.
pub fn split_point<S: ObjectStore + ?Sized>(
    store: &S,
    a: ObjectId,
    b: ObjectId,
) -> Result<Option<ObjectId>> {
    let of_a = ancestor_ids(store, a)?;
    for commit in ancestors(store, b) {
        let commit = commit?;
        if of_a.contains(&commit.id()) {
            return Ok(Some(commit.id()));
        }
    }
    Ok(None)
}

/// Whether `ancestor` is `descendant` or one of its ancestors.
///
/// Only commits reachable from `descendant` are loaded, so `ancestor` need
/// not be present in `store`.
///
/// # Errors
/// Returns error if a commit along the way is missing.
pub fn is_ancestor<S: ObjectStore + ?Sized>(
    store: &S,
    ancestor: ObjectId,
    descendant: ObjectId,
) -> Result<bool> {
    if ancestor == descendant {
        return Ok(true);
    }
    for commit in ancestors(store, descendant) {
        if commit?.parents().any(|parent| parent == ancestor) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Walk first parents from a commit back to the root.
pub struct FirstParent<'a, S: ?Sized> {
    store: &'a S,
    next: Option<ObjectId>,
}

impl<S: ObjectStore + ?Sized> Iterator for FirstParent<'_, S> {
    type Item = Result<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        Some(self.store.commit(&id).map_err(Into::into).inspect(|commit| {
            self.next = commit.parent1();
        }))
    }
}

/// History of `start` along first parents, newest first.
pub const fn first_parent<S: ObjectStore + ?Sized>(store: &S, start: ObjectId) -> FirstParent<'_, S> {
    FirstParent {
        store,
        next: Some(start),
    }
}
