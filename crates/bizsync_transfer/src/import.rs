//! Preview and apply of a validated bundle.

use crate::error::TransferResult;
use crate::validate::ValidatedBundle;
use bizsync_reconcile::{ApplyReport, Reconciler, ReconciliationPlan};
use bizsync_store::LocalStore;
use tracing::{info, warn};

/// Options controlling an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Delete local records absent from the bundle, for kinds that
    /// support deletion.
    pub delete_orphans: bool,
}

impl ImportOptions {
    /// Creates default options (no orphan deletion).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets orphan deletion.
    pub fn with_delete_orphans(mut self, delete_orphans: bool) -> Self {
        self.delete_orphans = delete_orphans;
        self
    }
}

/// Merges validated bundles into a local store.
///
/// Only a [`ValidatedBundle`] is accepted, so an invalid bundle can never
/// reach the reconciler.
#[derive(Debug)]
pub struct ImportEngine<S> {
    reconciler: Reconciler<S>,
}

impl<S: LocalStore> ImportEngine<S> {
    /// Creates an import engine over a store.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            reconciler: Reconciler::new(store),
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        self.reconciler.store()
    }

    /// Classifies the bundle against current local state, kind by kind,
    /// without mutating anything.
    pub fn preview(
        &self,
        bundle: &ValidatedBundle,
        options: &ImportOptions,
    ) -> TransferResult<ReconciliationPlan> {
        let mut plan = ReconciliationPlan::new();
        for (kind, records) in bundle.iter() {
            plan.merge(self.reconciler.preview(kind, records, options.delete_orphans)?);
        }
        info!(
            add = plan.to_add.len(),
            update = plan.to_update.len(),
            skip = plan.to_skip.len(),
            delete = plan.to_delete.len(),
            "import previewed"
        );
        Ok(plan)
    }

    /// Applies the bundle against the store's state at call time.
    ///
    /// Not atomic: kinds are applied in registry order and a failure in
    /// one kind is recorded in the report without undoing earlier kinds.
    /// The audit log is the record of what was actually done.
    pub fn apply(
        &self,
        bundle: &ValidatedBundle,
        options: &ImportOptions,
    ) -> TransferResult<ApplyReport> {
        let mut report = ApplyReport::new();
        for (kind, records) in bundle.iter() {
            match self.reconciler.apply(kind, records, options.delete_orphans) {
                Ok(kind_report) => report.merge(kind_report),
                Err(e) => {
                    warn!(kind = %kind, error = %e, "import of kind failed");
                    report.errors.push(format!("import {}: {e}", kind.local_collection()));
                }
            }
        }
        info!(
            applied = report.audit.len(),
            failed = report.errors.len(),
            "import applied"
        );
        Ok(report)
    }
}
