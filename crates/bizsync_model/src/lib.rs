//! # bizsync Model
//!
//! Entity catalog and record types shared by every bizsync crate.
//!
//! This crate provides:
//! - [`EntityKind`] and the static table registry (local collection ↔ remote table)
//! - [`Record`], a schemaless JSON object with `id` / `updatedAt` accessors
//! - Per-kind field schemas consumed by the import validator
//! - [`FieldMapper`], the local ↔ remote field naming translator
//!
//! This is a pure crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod kind;
mod mapper;
mod record;
pub mod registry;
pub mod schema;
mod timestamp;

pub use error::{ModelError, ModelResult};
pub use kind::{EntityKind, TableInfo};
pub use mapper::{camel_to_snake, FieldMapper, RETIRED_FIELDS};
pub use record::{json_type_name, Record, ID_FIELD, UPDATED_AT_FIELD};
pub use schema::{FieldKind, FieldSpec, JOB_STATUSES};
pub use timestamp::{format_timestamp, parse_timestamp};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Product identifier stamped into export bundles.
pub const APP_NAME: &str = "bizsync";
