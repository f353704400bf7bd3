//! # bizsync Testkit
//!
//! Test utilities for bizsync.
//!
//! This crate provides:
//! - Record builders for every entity kind, valid against the field schemas
//! - A sample dataset and stores pre-populated with it
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use bizsync_testkit::prelude::*;
//! use bizsync_store::LocalStore;
//!
//! with_sample_store(|store| {
//!     assert!(!store.get_all(EntityKind::Job).unwrap().is_empty());
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use bizsync_model::{EntityKind, Record};
}

pub use fixtures::*;
pub use generators::*;
