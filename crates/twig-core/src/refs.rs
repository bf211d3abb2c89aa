//! Branch pointers and the current branch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use twig_store::ObjectId;

use crate::branch_name::BranchName;
use crate::error::{Error, Result};

/// Every branch pointer plus which one is checked out.
///
/// Head is not stored separately: it is always the current branch's
/// pointer, so moving one moves the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refs {
    current: BranchName,
    branches: BTreeMap<BranchName, ObjectId>,
}

impl Refs {
    /// A single branch `current` pointing at `head`.
    #[must_use]
    pub fn new(current: BranchName, head: ObjectId) -> Self {
        let branches = BTreeMap::from([(current.clone(), head)]);
        Self { current, branches }
    }

    /// Name of the checked-out branch.
    #[must_use]
    pub const fn current(&self) -> &BranchName {
        &self.current
    }

    /// The commit the current branch points at.
    ///
    /// # Errors
    /// Returns `BranchNotFound` if the current branch has no pointer, which
    /// only a hand-edited refs file can cause.
    pub fn head(&self) -> Result<ObjectId> {
        self.get(&self.current)
            .ok_or_else(|| Error::BranchNotFound(self.current.to_string()))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<ObjectId> {
        self.branches.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.branches.contains_key(name)
    }

    /// Branches in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&BranchName, &ObjectId)> {
        self.branches.iter()
    }

    /// Create a new branch.
    ///
    /// # Errors
    /// Returns `BranchExists` if the name is taken.
    pub fn create(&mut self, name: BranchName, id: ObjectId) -> Result<()> {
        if self.branches.contains_key(&name) {
            return Err(Error::BranchExists(name.into_inner()));
        }
        self.branches.insert(name, id);
        Ok(())
    }

    /// Point `name` at `id`, creating the branch if needed.
    pub fn set(&mut self, name: BranchName, id: ObjectId) {
        self.branches.insert(name, id);
    }

    /// Move the current branch, and with it Head.
    pub fn move_head(&mut self, id: ObjectId) {
        self.branches.insert(self.current.clone(), id);
    }

    /// Make `name` the checked-out branch.
    ///
    /// # Errors
    /// Returns `BranchNotFound` if no such branch exists.
    pub fn switch_to(&mut self, name: &str) -> Result<()> {
        let (name, _) = self
            .branches
            .get_key_value(name)
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))?;
        self.current = name.clone();
        Ok(())
    }

    /// Delete a branch pointer.
    ///
    /// # Errors
    /// Returns `CannotRemoveCurrentBranch` or `BranchNotFound`.
    pub fn remove(&mut self, name: &str) -> Result<ObjectId> {
        if self.current == name {
            return Err(Error::CannotRemoveCurrentBranch);
        }
        self.branches
            .remove(name)
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))
    }
}
