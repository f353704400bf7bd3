//! # bizsync Sync Engine
//!
//! Bidirectional sync between the local store and a remote store.
//!
//! This crate provides:
//! - Sync state machine (idle → pulling → pushing → synced/error)
//! - Incremental pull bounded by a persisted cursor
//! - Batched, retried push keyed by record id
//! - Last-write-wins conflict handling via `bizsync_reconcile`
//! - Remote store abstraction with in-memory and HTTP implementations
//!
//! ## Architecture
//!
//! The sync engine implements a **pull-then-push** model:
//! 1. Pull remote rows modified after the cursor, owned by the principal
//! 2. Reconcile each row against its local counterpart
//! 3. Push every local record in fixed-size upsert batches
//! 4. Set the cursor to the cycle start time
//!
//! ## Key Invariants
//!
//! - Pull always happens before push
//! - Equal timestamps keep the local record
//! - A failed table, batch or record never aborts the cycle
//! - A missing principal aborts pull and push before any table is touched
//!
//! ## Example
//!
//! ```rust
//! use bizsync_sync_engine::{MemoryRemoteStore, StaticAuth, SyncConfig, SyncEngine};
//! use bizsync_store::MemoryStore;
//!
//! let engine = SyncEngine::new(
//!     SyncConfig::default(),
//!     MemoryRemoteStore::new(),
//!     MemoryStore::new(),
//!     StaticAuth::signed_in("user-1"),
//! );
//! let result = engine.sync().unwrap();
//! assert!(result.success);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod config;
mod error;
mod http;
mod puller;
mod pusher;
mod remote;
mod state;

pub use auth::{AuthProvider, Principal, StaticAuth};
pub use config::{RetryConfig, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use http::{HttpClient, HttpRemoteStore, HttpResponse};
pub use puller::{PullOutcome, Puller};
pub use pusher::{PushOutcome, Pusher};
pub use remote::{Filter, MemoryRemoteStore, RemoteQuery, RemoteStore};
pub use state::{PendingChanges, SyncCycleResult, SyncEngine, SyncState, SyncStats};
