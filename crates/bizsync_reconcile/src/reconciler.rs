//! Preview and apply against a local store.

use crate::classify::{classify, Action, Classification};
use crate::error::{ReconcileError, ReconcileResult};
use crate::plan::{ApplyReport, AuditEntry, ReconciliationPlan};
use bizsync_model::{EntityKind, Record};
use bizsync_store::{LocalStore, StoreError, StoreOp};
use tracing::{debug, warn};

/// Runs classification against a local store.
///
/// Preview and apply share [`classify`]: apply classifies the whole
/// incoming set against the current local state first, then mutates, so
/// both produce the same classification sequence for the same state.
#[derive(Debug)]
pub struct Reconciler<S> {
    store: S,
}

impl<S: LocalStore> Reconciler<S> {
    /// Creates a reconciler over a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Classifies `incoming` against the current local records of `kind`.
    pub fn classify(
        &self,
        kind: EntityKind,
        incoming: &[Record],
        allow_orphan_delete: bool,
    ) -> ReconcileResult<Vec<Classification>> {
        let local = self.store.get_all(kind)?;
        classify(kind, &local, incoming, allow_orphan_delete)
    }

    /// Classifies without touching the store.
    pub fn preview(
        &self,
        kind: EntityKind,
        incoming: &[Record],
        allow_orphan_delete: bool,
    ) -> ReconcileResult<ReconciliationPlan> {
        let plan: ReconciliationPlan = self
            .classify(kind, incoming, allow_orphan_delete)?
            .into_iter()
            .collect();
        debug!(
            kind = %kind,
            add = plan.to_add.len(),
            update = plan.to_update.len(),
            skip = plan.to_skip.len(),
            delete = plan.to_delete.len(),
            "previewed"
        );
        Ok(plan)
    }

    /// Classifies and performs each mutation.
    ///
    /// The mutations go to the store as one batch. A failed mutation is
    /// recorded in the report and the pass continues.
    ///
    /// # Errors
    ///
    /// Fails before mutating anything if local state cannot be read, an
    /// incoming record has no id, or the store cannot commit the batch.
    pub fn apply(
        &self,
        kind: EntityKind,
        incoming: &[Record],
        allow_orphan_delete: bool,
    ) -> ReconcileResult<ApplyReport> {
        let classifications = self.classify(kind, incoming, allow_orphan_delete)?;

        let mut ops = Vec::new();
        let staged: Vec<ReconcileResult<bool>> = classifications
            .iter()
            .map(|c| -> ReconcileResult<bool> {
                Ok(match store_op(c)? {
                    Some(op) => {
                        ops.push(op);
                        true
                    }
                    None => false,
                })
            })
            .collect();

        let mut results = self.store.apply_batch(kind, ops)?.into_iter();
        let mut report = ApplyReport::new();

        for (classification, staged) in classifications.iter().zip(staged) {
            let outcome = staged.and_then(|queued| {
                if !queued {
                    return Ok(());
                }
                match results.next() {
                    Some(Ok(())) => Ok(()),
                    Some(Err(source)) => Err(mutation_error(classification, source)),
                    None => Err(mutation_error(
                        classification,
                        StoreError::Corrupted("batch returned fewer results than ops".into()),
                    )),
                }
            });
            match outcome {
                Ok(()) => report.audit.push(AuditEntry::from(classification)),
                Err(e) => {
                    warn!(error = %e, "apply failed");
                    report.errors.push(e.to_string());
                }
            }
        }

        debug!(
            kind = %kind,
            applied = report.audit.len(),
            failed = report.errors.len(),
            "applied"
        );
        Ok(report)
    }

    /// Reconciles a single incoming record against its local counterpart.
    ///
    /// Used by pull, which compares row by row rather than diffing whole
    /// tables. A singleton is compared against its stored row whatever the
    /// ids. Never deletes.
    pub fn apply_one(&self, kind: EntityKind, incoming: &Record) -> ReconcileResult<Classification> {
        let id = incoming.require_id(kind)?;
        let local: Vec<Record> = if kind.is_singleton() {
            self.store.get_all(kind)?
        } else {
            self.store.get(kind, id)?.into_iter().collect()
        };
        let mut classified = classify(kind, &local, std::slice::from_ref(incoming), false)?;
        let classification = classified
            .pop()
            .ok_or_else(|| bizsync_model::ModelError::MissingId {
                kind: kind.label().to_string(),
            })?;
        if let Some(op) = store_op(&classification)? {
            op.apply_to(&self.store, kind)
                .map_err(|source| mutation_error(&classification, source))?;
        }
        Ok(classification)
    }
}

/// The store mutation a classification calls for, if any.
fn store_op(c: &Classification) -> ReconcileResult<Option<StoreOp>> {
    match (c.action, &c.incoming) {
        (Action::Skip, _) => Ok(None),
        (Action::Add, Some(record)) => Ok(Some(StoreOp::Add(record.clone()))),
        (Action::Update, Some(record)) => Ok(Some(StoreOp::Update(record.clone()))),
        (Action::Delete, _) => Ok(Some(StoreOp::Delete(c.id.clone()))),
        (action @ (Action::Add | Action::Update), None) => Err(ReconcileError::MissingIncoming {
            action,
            kind: c.kind.label().to_string(),
            id: c.id.clone(),
        }),
    }
}

fn mutation_error(c: &Classification, source: StoreError) -> ReconcileError {
    ReconcileError::Mutation {
        action: c.action,
        kind: c.kind.label().to_string(),
        id: c.id.clone(),
        source,
    }
}
