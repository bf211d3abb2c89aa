//! Error types for twig-store.

use crate::hash::ObjectId;
use crate::object::ObjectKind;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing objects.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No object with this id is stored.
    #[error("no {kind} with id {id} exists")]
    ObjectNotFound { kind: ObjectKind, id: ObjectId },

    /// A commit id prefix matched zero or several commits.
    #[error("{}", describe_prefix(.prefix, *.matches))]
    AmbiguousOrMissingId {
        /// The abbreviated id that was looked up.
        prefix: String,
        /// How many stored commits matched it.
        matches: usize,
    },

    /// Text that is not a well-formed object id.
    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    /// Stored bytes do not hash to the id they are filed under.
    #[error("object {id} is corrupt: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

fn describe_prefix(prefix: &str, matches: usize) -> String {
    if matches == 0 {
        "No commit with that id exists.".to_string()
    } else {
        format!("Commit id '{prefix}' is ambiguous ({matches} matches).")
    }
}
