//! # twig-store
//!
//! Content-addressed object storage for twig. Blobs and commits are
//! immutable and keyed by the SHA-256 of their content. Stores sit behind
//! the [`ObjectStore`] trait, so a local repository and a remote one are
//! two instances of the same interface.

mod error;
mod hash;
mod memory;
mod object;
mod store;
mod traits;

pub use error::{Error, Result};
pub use hash::ObjectId;
pub use memory::MemoryStore;
pub use object::{Blob, Commit, ObjectKind};
pub use store::{FsStore, write_atomic};
pub use traits::{ObjectStore, TransferStats, transfer_commit};
