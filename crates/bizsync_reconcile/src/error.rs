//! Error types for reconciliation.

use crate::classify::Action;
use bizsync_model::ModelError;
use bizsync_store::StoreError;
use thiserror::Error;

/// Result type for reconciliation.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Errors that can occur while reconciling.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// An incoming record is malformed (e.g. has no id).
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Reading local state failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Applying a single classification failed.
    #[error("{action} {kind} {id}: {source}")]
    Mutation {
        /// Action that was being applied.
        action: Action,
        /// Entity kind label.
        kind: String,
        /// Record id.
        id: String,
        /// Underlying store failure.
        #[source]
        source: StoreError,
    },

    /// An add or update classification carries no incoming record.
    #[error("{action} {kind} {id}: no incoming record")]
    MissingIncoming {
        /// Action that was classified.
        action: Action,
        /// Entity kind label.
        kind: String,
        /// Record id.
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_error_names_record() {
        let err = ReconcileError::Mutation {
            action: Action::Update,
            kind: "Job".into(),
            id: "J1".into(),
            source: StoreError::NotFound {
                kind: "Job".into(),
                id: "J1".into(),
            },
        };
        assert_eq!(err.to_string(), "update Job J1: Job J1 not found");
    }
}
