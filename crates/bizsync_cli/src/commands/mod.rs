//! CLI command implementations.

pub mod export;
pub mod import;
pub mod status;
pub mod validate;

use bizsync_transfer::{read_bundle, TransferError, ValidatedBundle};
use std::path::Path;

/// Reads and validates a bundle, printing every violation on failure.
pub fn load_bundle(file: &Path) -> Result<ValidatedBundle, Box<dyn std::error::Error>> {
    let value = read_bundle(file)?;
    match ValidatedBundle::parse(value) {
        Ok(bundle) => Ok(bundle),
        Err(TransferError::Invalid(report)) => {
            println!("✗ Bundle is invalid ({} errors)", report.errors.len());
            for error in &report.errors {
                println!("  {error}");
            }
            Err("Bundle validation failed".into())
        }
        Err(e) => Err(e.into()),
    }
}
