//! Preview plans and apply audit logs.

use crate::classify::{Action, Classification};
use bizsync_model::EntityKind;
use serde::{Deserialize, Serialize};

/// The no-mutation output of a preview.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationPlan {
    /// Records that would be created.
    pub to_add: Vec<Classification>,
    /// Records that would be overwritten.
    pub to_update: Vec<Classification>,
    /// Records that would be left alone.
    pub to_skip: Vec<Classification>,
    /// Local records that would be deleted.
    pub to_delete: Vec<Classification>,
}

impl ReconciliationPlan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Files a classification under its action.
    pub fn push(&mut self, classification: Classification) {
        match classification.action {
            Action::Add => self.to_add.push(classification),
            Action::Update => self.to_update.push(classification),
            Action::Skip => self.to_skip.push(classification),
            Action::Delete => self.to_delete.push(classification),
        }
    }

    /// Appends another plan, keeping order within each list.
    pub fn merge(&mut self, other: ReconciliationPlan) {
        self.to_add.extend(other.to_add);
        self.to_update.extend(other.to_update);
        self.to_skip.extend(other.to_skip);
        self.to_delete.extend(other.to_delete);
    }

    /// Entries planned for an action.
    pub fn entries(&self, action: Action) -> &[Classification] {
        match action {
            Action::Add => &self.to_add,
            Action::Update => &self.to_update,
            Action::Skip => &self.to_skip,
            Action::Delete => &self.to_delete,
        }
    }

    /// Number of entries of one kind planned for an action.
    pub fn count(&self, kind: EntityKind, action: Action) -> usize {
        self.entries(action).iter().filter(|c| c.kind == kind).count()
    }

    /// Number of entries that would mutate the local store.
    pub fn change_count(&self) -> usize {
        self.to_add.len() + self.to_update.len() + self.to_delete.len()
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.change_count() + self.to_skip.len()
    }

    /// Returns true if nothing was classified.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Classification> for ReconciliationPlan {
    fn from_iter<I: IntoIterator<Item = Classification>>(iter: I) -> Self {
        let mut plan = Self::new();
        for classification in iter {
            plan.push(classification);
        }
        plan
    }
}

/// One record actually processed by an apply pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Kind label, e.g. `"Job"`.
    pub entity_type: String,
    /// Record id.
    pub entity_id: String,
    /// Display name of the record.
    pub entity_name: String,
    /// Applied action.
    pub action: Action,
    /// Human-readable reason.
    pub reason: String,
}

impl From<&Classification> for AuditEntry {
    fn from(c: &Classification) -> Self {
        Self {
            entity_type: c.kind.label().to_string(),
            entity_id: c.id.clone(),
            entity_name: c.name.clone(),
            action: c.action,
            reason: c.reason.to_string(),
        }
    }
}

/// Result of an apply pass: the audit log plus per-record failures.
///
/// Apply is not atomic; `audit` lists exactly what was done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    /// Ordered audit log.
    pub audit: Vec<AuditEntry>,
    /// Failures, each naming the record.
    pub errors: Vec<String>,
}

impl ApplyReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends another report.
    pub fn merge(&mut self, other: ApplyReport) {
        self.audit.extend(other.audit);
        self.errors.extend(other.errors);
    }

    /// Number of audit entries with an action.
    pub fn count(&self, action: Action) -> usize {
        self.audit.iter().filter(|e| e.action == action).count()
    }

    /// Number of audit entries of one kind with an action.
    pub fn count_for(&self, kind: EntityKind, action: Action) -> usize {
        self.audit
            .iter()
            .filter(|e| e.action == action && e.entity_type == kind.label())
            .count()
    }

    /// Returns true if no record failed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Reason;

    fn entry(kind: EntityKind, id: &str, action: Action) -> Classification {
        Classification {
            kind,
            id: id.into(),
            name: id.into(),
            action,
            reason: Reason::NewRecord,
            incoming: None,
            existing: None,
        }
    }

    #[test]
    fn plan_groups_by_action() {
        let plan: ReconciliationPlan = vec![
            entry(EntityKind::Job, "J1", Action::Add),
            entry(EntityKind::Job, "J2", Action::Skip),
            entry(EntityKind::System, "S1", Action::Add),
            entry(EntityKind::Laborer, "L5", Action::Delete),
        ]
        .into_iter()
        .collect();

        assert_eq!(plan.to_add.len(), 2);
        assert_eq!(plan.count(EntityKind::Job, Action::Add), 1);
        assert_eq!(plan.change_count(), 3);
        assert_eq!(plan.len(), 4);
    }

    #[test]
    fn audit_entry_shape() {
        let audit = AuditEntry::from(&entry(EntityKind::Job, "J9", Action::Add));
        let json = serde_json::to_value(&audit).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "entityType": "Job",
                "entityId": "J9",
                "entityName": "J9",
                "action": "add",
                "reason": "New record"
            })
        );
    }

    #[test]
    fn plan_serializes_camel_case() {
        let json = serde_json::to_value(ReconciliationPlan::new()).unwrap();
        assert!(json.get("toAdd").is_some());
        assert!(json.get("toDelete").is_some());
    }
}
