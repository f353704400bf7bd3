//! # bizsync Store
//!
//! The local store collaborator: per-kind CRUD over [`Record`]s plus a small
//! key-value metadata surface used to persist the sync cursor.
//!
//! ## Available Stores
//!
//! - [`MemoryStore`] - For testing and ephemeral use
//! - [`FileStore`] - A single JSON document on disk, written atomically
//!
//! ## Example
//!
//! ```rust
//! use bizsync_model::{EntityKind, Record};
//! use bizsync_store::{LocalStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store
//!     .add(EntityKind::Laborer, Record::new().with("id", "L1").with("name", "Ana"))
//!     .unwrap();
//! assert_eq!(store.get_all(EntityKind::Laborer).unwrap().len(), 1);
//! ```
//!
//! [`Record`]: bizsync_model::Record

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cursor;
mod data;
mod error;
mod file;
mod memory;
mod store;

pub use cursor::{SyncCursor, CURSOR_KEY};
pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{LocalStore, StoreOp};
