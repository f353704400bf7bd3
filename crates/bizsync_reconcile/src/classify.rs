//! Pure classification of incoming records against local state.

use crate::error::ReconcileResult;
use crate::lww::{resolve, Resolution};
use bizsync_model::{EntityKind, Record};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// What reconciliation does with one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Create the incoming record locally.
    Add,
    /// Overwrite the local record with the incoming one.
    Update,
    /// Leave the local record as it is.
    Skip,
    /// Remove a local record absent from the incoming set.
    Delete,
}

impl Action {
    /// Lowercase name as used in audit entries.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Update => "update",
            Action::Skip => "skip",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a record received its action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    /// No local record with this id.
    NewRecord,
    /// Incoming `updatedAt` is strictly newer.
    IncomingNewer,
    /// Local `updatedAt` is equal or newer.
    LocalSameOrNewer,
    /// Incoming `updatedAt` is missing or unparseable.
    IncomingTimestampUnreadable,
    /// Kind has no timestamp and the id exists locally.
    AlreadyExists,
    /// Local record has no counterpart in the incoming set.
    NotInIncoming,
}

impl Reason {
    /// Human-readable reason.
    pub fn as_str(self) -> &'static str {
        match self {
            Reason::NewRecord => "New record",
            Reason::IncomingNewer => "Incoming version is newer",
            Reason::LocalSameOrNewer => "Local version is same or newer",
            Reason::IncomingTimestampUnreadable => "Incoming timestamp is missing or invalid",
            Reason::AlreadyExists => "Already exists",
            Reason::NotInIncoming => "Not in import file",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Reason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The decision for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Entity kind.
    pub kind: EntityKind,
    /// Record id.
    pub id: String,
    /// Display name of the record.
    pub name: String,
    /// Decided action.
    pub action: Action,
    /// Why.
    pub reason: Reason,
    /// Incoming version (absent for deletes).
    #[serde(skip)]
    pub incoming: Option<Record>,
    /// Local version it was compared against.
    #[serde(skip)]
    pub existing: Option<Record>,
}

/// Classifies `incoming` against the `local` records of one kind.
///
/// Output order is incoming order followed by orphans in local order.
/// A repeated incoming id is compared against the earlier incoming
/// version, as an apply pass would see it. Singleton kinds compare
/// against the one stored row whatever its id.
///
/// # Errors
///
/// Returns `ModelError::MissingId` if a record has no string id.
pub fn classify(
    kind: EntityKind,
    local: &[Record],
    incoming: &[Record],
    allow_orphan_delete: bool,
) -> ReconcileResult<Vec<Classification>> {
    let mut view: HashMap<&str, &Record> = HashMap::with_capacity(local.len());
    for record in local {
        view.insert(record.require_id(kind)?, record);
    }

    let mut out = Vec::with_capacity(incoming.len());
    let mut seen = HashSet::with_capacity(incoming.len());

    for record in incoming {
        let id = record.require_id(kind)?;
        seen.insert(id);

        let existing = if kind.is_singleton() {
            view.values().next().copied()
        } else {
            view.get(id).copied()
        };
        let (action, reason) = match existing {
            None => (Action::Add, Reason::NewRecord),
            Some(_) if !kind.has_timestamp() => (Action::Skip, Reason::AlreadyExists),
            Some(current) => match resolve(current, record) {
                Resolution::AcceptIncoming => (Action::Update, Reason::IncomingNewer),
                Resolution::KeepLocal => (Action::Skip, Reason::LocalSameOrNewer),
                Resolution::IncomingUnreadable => {
                    (Action::Skip, Reason::IncomingTimestampUnreadable)
                }
            },
        };

        if action != Action::Skip {
            if kind.is_singleton() {
                view.clear();
            }
            view.insert(id, record);
        }

        out.push(Classification {
            kind,
            id: id.to_string(),
            name: record.display_name(kind),
            action,
            reason,
            incoming: Some(record.clone()),
            existing: existing.cloned(),
        });
    }

    if allow_orphan_delete && kind.supports_delete() {
        for record in local {
            let id = record.require_id(kind)?;
            if !seen.contains(id) {
                out.push(Classification {
                    kind,
                    id: id.to_string(),
                    name: record.display_name(kind),
                    action: Action::Delete,
                    reason: Reason::NotInIncoming,
                    incoming: None,
                    existing: Some(record.clone()),
                });
            }
        }
    }

    Ok(out)
}
