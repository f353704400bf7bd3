//! Records overwritten by an incoming version.

use crate::classify::{Action, Classification};
use bizsync_model::EntityKind;
use serde::Serialize;

/// A local record that was overwritten by a newer remote record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// Entity kind.
    pub kind: EntityKind,
    /// Record id.
    pub id: String,
    /// `updatedAt` of the overwritten local record.
    pub local_updated_at: Option<String>,
    /// `updatedAt` of the winning remote record.
    pub remote_updated_at: Option<String>,
}

impl Conflict {
    /// Extracts a conflict from an applied classification.
    ///
    /// Only updates of an existing record count; adds and skips do not.
    pub fn from_classification(c: &Classification) -> Option<Self> {
        if c.action != Action::Update {
            return None;
        }
        let existing = c.existing.as_ref()?;
        Some(Self {
            kind: c.kind,
            id: c.id.clone(),
            local_updated_at: existing.updated_at_raw().map(str::to_string),
            remote_updated_at: c
                .incoming
                .as_ref()
                .and_then(|r| r.updated_at_raw())
                .map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use bizsync_model::Record;

    #[test]
    fn only_updates_are_conflicts() {
        let local = vec![Record::new()
            .with("id", "J1")
            .with("updatedAt", "2024-01-01T00:00:00Z")];
        let incoming = vec![
            Record::new()
                .with("id", "J1")
                .with("updatedAt", "2024-02-01T00:00:00Z"),
            Record::new()
                .with("id", "J2")
                .with("updatedAt", "2024-02-01T00:00:00Z"),
        ];
        let out = classify(EntityKind::Job, &local, &incoming, false).unwrap();
        let conflicts: Vec<_> = out.iter().filter_map(Conflict::from_classification).collect();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].id, "J1");
        assert_eq!(
            conflicts[0].local_updated_at.as_deref(),
            Some("2024-01-01T00:00:00Z")
        );
        assert_eq!(
            conflicts[0].remote_updated_at.as_deref(),
            Some("2024-02-01T00:00:00Z")
        );
    }
}
