//! Property-based tests for the object model, commit graph and merge rules.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use proptest::prelude::*;

use twig_core::graph;
use twig_core::merge::{MergeAction, classify, conflict_text};
use twig_core::BranchName;
use twig_store::{Blob, Commit, MemoryStore, ObjectId, ObjectStore};

/// Snapshot of short file names to small contents.
fn snapshot() -> impl Strategy<Value = BTreeMap<String, Vec<u8>>> {
    prop::collection::btree_map("[a-z]{1,8}\\.txt", prop::collection::vec(any::<u8>(), 0..64), 0..6)
}

/// One file's version: absent, or one of three contents.
fn version() -> impl Strategy<Value = Option<ObjectId>> {
    prop_oneof![
        Just(None),
        Just(Some(Blob::new("a").id())),
        Just(Some(Blob::new("b").id())),
        Just(Some(Blob::new("c").id())),
    ]
}

fn build_commit(message: &str, seconds: i64, files: &BTreeMap<String, Vec<u8>>) -> Commit {
    let files = files
        .iter()
        .map(|(name, content)| (name.clone(), Blob::new(content.clone()).id()))
        .collect();
    let timestamp = DateTime::<Utc>::from_timestamp(seconds, 0).unwrap();
    Commit::new(message, timestamp, files, None, None).unwrap()
}

fn chain(store: &MemoryStore, len: usize) -> Vec<ObjectId> {
    let mut ids: Vec<ObjectId> = Vec::with_capacity(len);
    for i in 0..len {
        let seconds = i64::try_from(i).unwrap();
        let timestamp = DateTime::<Utc>::from_timestamp(seconds, 0).unwrap();
        let commit = Commit::new(
            format!("c{i}"),
            timestamp,
            BTreeMap::new(),
            ids.last().copied(),
            None,
        )
        .unwrap();
        ids.push(store.put_commit(&commit).unwrap());
    }
    ids
}

proptest! {
    /// Building the same commit twice yields the same id.
    #[test]
    fn commit_id_is_deterministic(
        message in ".{0,40}",
        seconds in 0i64..4_000_000_000,
        files in snapshot(),
    ) {
        let first = build_commit(&message, seconds, &files);
        let second = build_commit(&message, seconds, &files);
        prop_assert_eq!(first.id(), second.id());
    }

    /// A commit decoded from its encoding is equal to the original.
    #[test]
    fn commit_survives_encoding(
        message in ".{0,40}",
        seconds in 0i64..4_000_000_000,
        files in snapshot(),
    ) {
        let commit = build_commit(&message, seconds, &files);
        let decoded = Commit::decode(&commit.encode().unwrap()).unwrap();
        prop_assert_eq!(decoded.id(), commit.id());
        prop_assert_eq!(decoded.files(), commit.files());
        prop_assert_eq!(decoded.message(), commit.message());
    }

    /// Changing the message changes the id.
    #[test]
    fn commit_id_depends_on_message(
        a in "[a-z]{1,10}",
        b in "[a-z]{1,10}",
        files in snapshot(),
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(build_commit(&a, 0, &files).id(), build_commit(&b, 0, &files).id());
    }

    /// On a linear chain the split point is the older commit.
    #[test]
    fn split_point_on_chain(len in 1usize..12, i in 0usize..12, j in 0usize..12) {
        let store = MemoryStore::new();
        let ids = chain(&store, len);
        let (i, j) = (i % len, j % len);
        let older = ids[i.min(j)];

        prop_assert_eq!(graph::split_point(&store, ids[i], ids[j]).unwrap(), Some(older));
        prop_assert!(graph::is_ancestor(&store, older, ids[i.max(j)]).unwrap());
    }

    /// The classifier agrees with the three-way rule table.
    #[test]
    fn classification_matches_rules(split in version(), current in version(), other in version()) {
        let action = classify(split, current, other);
        let expected = if current == split && current != other {
            MergeAction::TakeOther(other)
        } else if current != split && current != other && split != other {
            MergeAction::Conflict { current, other }
        } else {
            MergeAction::Unchanged
        };
        prop_assert_eq!(action, expected);
    }

    /// Conflict text always brackets both sides with line-leading markers.
    #[test]
    fn conflict_text_is_well_formed(
        current in "[a-z\n]{0,20}",
        other in "[a-z\n]{0,20}",
    ) {
        let text = String::from_utf8(conflict_text(current.as_bytes(), other.as_bytes())).unwrap();
        prop_assert!(text.starts_with("<<<<<<< HEAD\n"));
        prop_assert!(text.ends_with(">>>>>>>\n"));
        prop_assert!(text.contains("\n=======\n") || text.starts_with("<<<<<<< HEAD\n=======\n"));
        prop_assert!(text.contains(current.as_str()));
        prop_assert!(text.contains(other.as_str()));
    }

    /// A name with a space in it is never a valid branch name.
    #[test]
    fn branch_names_reject_spaces(prefix in "[a-z]{1,8}", suffix in "[a-z]{1,8}") {
        let spaced = format!("{prefix} {suffix}");
        let dashed = format!("{prefix}-{suffix}");
        prop_assert!(BranchName::new(spaced).is_err());
        prop_assert!(BranchName::new(dashed).is_ok());
    }
}
