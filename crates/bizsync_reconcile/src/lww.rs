//! Last-write-wins decision.

use bizsync_model::Record;

/// Outcome of comparing an existing record with an incoming version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Incoming `updatedAt` is strictly newer (or the local one is unreadable).
    AcceptIncoming,
    /// Local `updatedAt` is the same or newer.
    KeepLocal,
    /// Incoming `updatedAt` is missing or unparseable; it never wins.
    IncomingUnreadable,
}

impl Resolution {
    /// Returns true if the incoming record should overwrite the local one.
    pub fn incoming_wins(self) -> bool {
        matches!(self, Resolution::AcceptIncoming)
    }
}

/// Compares two versions of the same record by `updatedAt`.
///
/// Strict greater-than: equal timestamps keep the local record.
pub fn resolve(local: &Record, incoming: &Record) -> Resolution {
    let Some(incoming_ts) = incoming.updated_at() else {
        return Resolution::IncomingUnreadable;
    };
    match local.updated_at() {
        Some(local_ts) if incoming_ts > local_ts => Resolution::AcceptIncoming,
        Some(_) => Resolution::KeepLocal,
        None => Resolution::AcceptIncoming,
    }
}
