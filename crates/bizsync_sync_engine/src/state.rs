//! Sync engine state machine and orchestrator.

use crate::auth::AuthProvider;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::puller::{PullOutcome, Puller};
use crate::pusher::{PushOutcome, Pusher};
use crate::remote::RemoteStore;
use bizsync_model::{EntityKind, FieldMapper};
use bizsync_reconcile::Conflict;
use bizsync_store::{LocalStore, StoreResult, SyncCursor};
use chrono::{DateTime, SubsecRound, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

/// The current state of the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Engine is idle, not syncing.
    Idle,
    /// Engine is pulling changes from the remote.
    Pulling,
    /// Engine is pushing local records to the remote.
    Pushing,
    /// Last cycle finished without errors.
    Synced,
    /// Last cycle finished with errors.
    Error,
}

impl SyncState {
    /// Returns true if the engine is in an active sync state.
    pub fn is_active(&self) -> bool {
        matches!(self, SyncState::Pulling | SyncState::Pushing)
    }

    /// Returns true if the engine can start a new sync.
    pub fn can_start_sync(&self) -> bool {
        matches!(self, SyncState::Idle | SyncState::Synced | SyncState::Error)
    }
}

/// Statistics accumulated across sync cycles.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Total number of sync cycles completed.
    pub cycles_completed: u64,
    /// Total number of records pulled.
    pub records_pulled: u64,
    /// Total number of records pushed.
    pub records_pushed: u64,
    /// Total number of local records overwritten by remote ones.
    pub conflicts: u64,
    /// Total number of push retries.
    pub retries: u64,
    /// Start time of the last cycle.
    pub last_sync_time: Option<DateTime<Utc>>,
    /// First error of the last cycle, if any.
    pub last_error: Option<String>,
}

/// Result of a sync cycle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCycleResult {
    /// Identifier used in log lines for this cycle.
    pub cycle_id: Uuid,
    /// True iff `errors` is empty.
    pub success: bool,
    /// Records in accepted push batches.
    pub records_pushed: u64,
    /// Remote rows processed by the pull.
    pub records_pulled: u64,
    /// Number of local records overwritten by the pull.
    pub conflicts: u64,
    /// The overwritten records.
    pub conflict_details: Vec<Conflict>,
    /// Every recorded failure, with table or record context.
    pub errors: Vec<String>,
    /// Cycle start time; also the new cursor.
    pub timestamp: DateTime<Utc>,
    /// Wall-clock duration of the cycle.
    #[serde(skip)]
    pub duration: Duration,
}

/// Records changed since the last sync, per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingChanges {
    /// Pending count per kind, in registry order; kinds with none omitted.
    pub per_kind: Vec<(EntityKind, usize)>,
}

impl PendingChanges {
    /// Total pending records.
    pub fn total(&self) -> usize {
        self.per_kind.iter().map(|(_, n)| n).sum()
    }

    /// Returns true if anything is pending.
    pub fn has_pending(&self) -> bool {
        self.total() > 0
    }

    /// Scans a store for records modified after `cursor`.
    ///
    /// Before the first sync everything is pending. Afterwards a record is
    /// pending if its `updatedAt` is after the cursor or unreadable;
    /// kinds without timestamps are never pending.
    pub fn scan<S: LocalStore + ?Sized>(
        store: &S,
        cursor: Option<&SyncCursor>,
    ) -> StoreResult<Self> {
        let mut pending = PendingChanges::default();

        for kind in EntityKind::ALL {
            let records = store.get_all(kind)?;
            let count = match cursor {
                None => records.len(),
                Some(_) if !kind.has_timestamp() => 0,
                Some(cursor) => records
                    .iter()
                    .filter(|r| r.updated_at().map_or(true, |ts| ts > cursor.last_sync))
                    .count(),
            };
            if count > 0 {
                pending.per_kind.push((kind, count));
            }
        }

        Ok(pending)
    }
}

/// Sequences pull then push between a local store and a remote store.
///
/// Only one cycle may run at a time per engine; a concurrent `sync` call
/// is rejected with [`SyncError::InvalidStateTransition`]. Separate
/// engines over the same store must be serialized by the caller.
pub struct SyncEngine<R, S, A> {
    config: SyncConfig,
    remote: R,
    store: S,
    auth: A,
    mapper: FieldMapper,
    state: RwLock<SyncState>,
    stats: RwLock<SyncStats>,
}

impl<R, S, A> SyncEngine<R, S, A>
where
    R: RemoteStore,
    S: LocalStore,
    A: AuthProvider,
{
    /// Creates a new sync engine.
    pub fn new(config: SyncConfig, remote: R, store: S, auth: A) -> Self {
        Self {
            config,
            remote,
            store,
            auth,
            mapper: FieldMapper::new(),
            state: RwLock::new(SyncState::Idle),
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// Replaces the field mapper.
    pub fn with_mapper(mut self, mapper: FieldMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Gets the current state.
    pub fn state(&self) -> SyncState {
        *self.state.read()
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Gets the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Gets the local store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Gets the remote store.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Reads the persisted cursor.
    pub fn cursor(&self) -> SyncResult<Option<SyncCursor>> {
        Ok(SyncCursor::load(&self.store)?)
    }

    fn set_state(&self, state: SyncState) {
        *self.state.write() = state;
    }

    fn begin(&self) -> SyncResult<()> {
        let mut state = self.state.write();
        if !state.can_start_sync() {
            return Err(SyncError::InvalidStateTransition {
                from: format!("{:?}", *state),
                to: "sync".into(),
            });
        }
        *state = SyncState::Pulling;
        Ok(())
    }

    /// Performs a full sync cycle: pull then push.
    ///
    /// Per-table and per-record failures never abort the cycle; they are
    /// collected into the result's `errors`. The cursor is set to the
    /// cycle start time whether or not errors occurred.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidStateTransition`] if a cycle is already
    /// running on this engine.
    pub fn sync(&self) -> SyncResult<SyncCycleResult> {
        self.begin()?;

        // The cursor is stored at millisecond precision.
        let started = Utc::now().trunc_subsecs(3);
        let clock = Instant::now();
        let cycle_id = Uuid::new_v4();
        info!(%cycle_id, "sync started");

        let mut errors = Vec::new();

        let cursor = match SyncCursor::load(&self.store) {
            Ok(cursor) => cursor,
            Err(e) => {
                warn!(%cycle_id, error = %e, "unreadable cursor, pulling everything");
                errors.push(format!("cursor: {e}"));
                None
            }
        };

        let pull = self.pull_phase(cursor.as_ref(), &mut errors);
        info!(
            %cycle_id,
            pulled = pull.records_pulled,
            conflicts = pull.conflicts.len(),
            "pull finished"
        );

        self.set_state(SyncState::Pushing);
        let push = self.push_phase(started, &mut errors);
        info!(%cycle_id, pushed = push.records_pushed, "push finished");

        if let Err(e) = SyncCursor::new(started).save(&self.store) {
            warn!(%cycle_id, error = %e, "failed to save cursor");
            errors.push(format!("save cursor: {e}"));
        }

        let result = SyncCycleResult {
            cycle_id,
            success: errors.is_empty(),
            records_pushed: push.records_pushed,
            records_pulled: pull.records_pulled,
            conflicts: pull.conflicts.len() as u64,
            conflict_details: pull.conflicts,
            errors,
            timestamp: started,
            duration: clock.elapsed(),
        };

        self.set_state(if result.success {
            SyncState::Synced
        } else {
            SyncState::Error
        });

        {
            let mut stats = self.stats.write();
            stats.cycles_completed += 1;
            stats.records_pulled += result.records_pulled;
            stats.records_pushed += result.records_pushed;
            stats.conflicts += result.conflicts;
            stats.retries += push.retries;
            stats.last_sync_time = Some(started);
            stats.last_error = result.errors.first().cloned();
        }

        info!(
            %cycle_id,
            success = result.success,
            errors = result.errors.len(),
            "sync finished"
        );
        Ok(result)
    }

    fn pull_phase(&self, cursor: Option<&SyncCursor>, errors: &mut Vec<String>) -> PullOutcome {
        let Some(principal) = self.auth.current_principal() else {
            warn!("pull skipped: not authenticated");
            errors.push(format!("pull: {}", SyncError::NotAuthenticated));
            return PullOutcome::default();
        };
        let outcome =
            Puller::new(&self.remote, &self.store, &self.mapper, &self.config).pull(&principal, cursor);
        errors.extend(outcome.errors.iter().cloned());
        outcome
    }

    fn push_phase(&self, now: DateTime<Utc>, errors: &mut Vec<String>) -> PushOutcome {
        let Some(principal) = self.auth.current_principal() else {
            warn!("push skipped: not authenticated");
            errors.push(format!("push: {}", SyncError::NotAuthenticated));
            return PushOutcome::default();
        };
        let outcome =
            Pusher::new(&self.remote, &self.store, &self.mapper, &self.config).push(&principal, now);
        errors.extend(outcome.errors.iter().cloned());
        outcome
    }

    /// Counts local records modified since the last sync.
    ///
    /// See [`PendingChanges::scan`].
    pub fn pending_changes(&self) -> SyncResult<PendingChanges> {
        let cursor = self.cursor()?;
        Ok(PendingChanges::scan(&self.store, cursor.as_ref())?)
    }
}
