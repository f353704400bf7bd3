//! # bizsync Reconcile
//!
//! The reconciliation algorithm shared by sync pull and import.
//!
//! Given the local contents of one entity kind and an incoming set of
//! records (a remote pull or an import file), every incoming record is
//! classified as add, update or skip, and local records missing from the
//! incoming set may be classified as delete. Classification is pure; the
//! [`Reconciler`] then either collects it into a [`ReconciliationPlan`]
//! (preview) or performs the mutations and records [`AuditEntry`] values
//! (apply).
//!
//! ## Rules
//!
//! - No local record with the id: **add**
//! - Kind without timestamps: **skip** ("Already exists")
//! - Incoming `updatedAt` strictly newer: **update**, otherwise **skip**;
//!   ties keep the local record
//! - Orphan delete only when requested and the kind supports delete
//!
//! ## Example
//!
//! ```rust
//! use bizsync_model::{EntityKind, Record};
//! use bizsync_reconcile::{Action, Reconciler};
//! use bizsync_store::{LocalStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store
//!     .add(
//!         EntityKind::System,
//!         Record::new().with("id", "S1").with("updatedAt", "2024-06-01T00:00:00Z"),
//!     )
//!     .unwrap();
//!
//! let incoming = vec![
//!     Record::new().with("id", "S1").with("updatedAt", "2024-01-01T00:00:00Z"),
//!     Record::new().with("id", "S2").with("updatedAt", "2024-01-01T00:00:00Z"),
//! ];
//!
//! let reconciler = Reconciler::new(&store);
//! let plan = reconciler.preview(EntityKind::System, &incoming, false).unwrap();
//! assert_eq!(plan.to_skip.len(), 1);
//! assert_eq!(plan.to_add.len(), 1);
//!
//! let report = reconciler.apply(EntityKind::System, &incoming, false).unwrap();
//! assert_eq!(report.count(Action::Add), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod classify;
mod conflict;
mod error;
mod lww;
mod plan;
mod reconciler;

pub use classify::{classify, Action, Classification, Reason};
pub use conflict::Conflict;
pub use error::{ReconcileError, ReconcileResult};
pub use lww::{resolve, Resolution};
pub use plan::{ApplyReport, AuditEntry, ReconciliationPlan};
pub use reconciler::Reconciler;
