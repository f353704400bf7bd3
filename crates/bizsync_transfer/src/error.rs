//! Error types for export and import.

use crate::validate::ValidationReport;
use std::io;
use thiserror::Error;

/// Result type for transfer operations.
pub type TransferResult<T> = Result<T, TransferError>;

/// Errors that can occur during export or import.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The bundle failed structural validation; nothing was applied.
    #[error("invalid bundle ({} errors)", .0.errors.len())]
    Invalid(ValidationReport),

    /// An I/O error occurred reading or writing a bundle file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The bundle is not JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading local state failed.
    #[error("store error: {0}")]
    Store(#[from] bizsync_store::StoreError),

    /// Classifying a validated bundle against local state failed.
    #[error("reconcile error: {0}")]
    Reconcile(#[from] bizsync_reconcile::ReconcileError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ValidationError;

    #[test]
    fn invalid_counts_errors() {
        let report = ValidationReport::from_errors(vec![
            ValidationError::new("laborers", "expected array, got object"),
            ValidationError::new("metadata.appName", "expected \"bizsync\""),
        ]);
        assert_eq!(
            TransferError::Invalid(report).to_string(),
            "invalid bundle (2 errors)"
        );
    }
}
