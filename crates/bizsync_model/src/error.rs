//! Error types for the model layer.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by the catalog and record helpers.
///
/// The `Unknown*` variants are configuration errors: they indicate a name
/// that was never registered, not a problem with user data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Local collection name is not registered.
    #[error("unknown local collection: {0}")]
    UnknownCollection(String),

    /// Remote table name is not registered.
    #[error("unknown remote table: {0}")]
    UnknownTable(String),

    /// Entity kind name is not registered.
    #[error("unknown entity kind: {0}")]
    UnknownKind(String),

    /// Value is not a JSON object or is otherwise malformed.
    #[error("invalid record: {message}")]
    InvalidRecord {
        /// Description of the problem.
        message: String,
    },

    /// Record carries no string `id`.
    #[error("{kind} record has no id")]
    MissingId {
        /// Entity kind label.
        kind: String,
    },

    /// Timestamp could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl ModelError {
    /// Creates an invalid record error.
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ModelError::UnknownTable("widgets".into());
        assert_eq!(err.to_string(), "unknown remote table: widgets");

        let err = ModelError::MissingId { kind: "Job".into() };
        assert_eq!(err.to_string(), "Job record has no id");
    }
}
