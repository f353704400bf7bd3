//! # bizsync Transfer
//!
//! Offline export and import for bizsync.
//!
//! - [`Exporter`] snapshots every registered kind into an [`ExportBundle`].
//! - [`validate_bundle`] checks an untrusted bundle against the field
//!   schemas and reports every violation.
//! - [`ImportEngine`] previews or applies a [`ValidatedBundle`] through
//!   the shared reconciler.
//!
//! ## Example
//!
//! ```rust
//! use bizsync_store::MemoryStore;
//! use bizsync_transfer::{Exporter, ImportEngine, ImportOptions, ValidatedBundle};
//!
//! let source = MemoryStore::new();
//! let bundle = Exporter::new(&source).export().unwrap();
//!
//! let validated = ValidatedBundle::parse(bundle.to_value().unwrap()).unwrap();
//! let target = MemoryStore::new();
//! let report = ImportEngine::new(&target)
//!     .apply(&validated, &ImportOptions::default())
//!     .unwrap();
//! assert!(report.audit.is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bundle;
mod error;
mod export;
mod import;
mod validate;

pub use bundle::{read_bundle, BundleMetadata, ExportBundle, EXPORT_VERSION, METADATA_KEY};
pub use error::{TransferError, TransferResult};
pub use export::Exporter;
pub use import::{ImportEngine, ImportOptions};
pub use validate::{validate_bundle, ValidatedBundle, ValidationError, ValidationReport};
