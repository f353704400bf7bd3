//! Error types for local store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the local store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Stored data could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Record has no usable id.
    #[error(transparent)]
    Model(#[from] bizsync_model::ModelError),

    /// `add` was called with an id that already exists.
    #[error("{kind} {id} already exists")]
    DuplicateId {
        /// Entity kind label.
        kind: String,
        /// Record id.
        id: String,
    },

    /// `update` or `delete` referenced a missing record.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity kind label.
        kind: String,
        /// Record id.
        id: String,
    },

    /// The kind does not support deletion.
    #[error("{kind} records cannot be deleted")]
    DeleteUnsupported {
        /// Entity kind label.
        kind: String,
    },

    /// Another process holds the store lock.
    #[error("store locked: another process has exclusive access")]
    Locked,

    /// The store file is corrupted.
    #[error("store corrupted: {0}")]
    Corrupted(String),
}
