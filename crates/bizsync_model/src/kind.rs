//! Entity kinds and their per-table metadata.

use crate::error::ModelError;
use crate::registry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every synchronizable entity type.
///
/// The declaration order is the registry order: pull, push, export and
/// import all walk the kinds in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// An installable system offered to customers.
    System,
    /// A quoted or completed job.
    Job,
    /// A crew member with an hourly rate.
    Laborer,
    /// A purchasable material.
    Material,
    /// A job category label. Carries no `updatedAt`.
    JobCategory,
    /// Global cost settings (one row per owner).
    CostSettings,
    /// Inventory aggregate (one row per owner).
    Inventory,
}

impl EntityKind {
    /// All kinds in registry order.
    pub const ALL: [EntityKind; 7] = [
        EntityKind::System,
        EntityKind::Job,
        EntityKind::Laborer,
        EntityKind::Material,
        EntityKind::JobCategory,
        EntityKind::CostSettings,
        EntityKind::Inventory,
    ];

    /// Returns the registry entry for this kind.
    pub fn info(self) -> &'static TableInfo {
        &registry::TABLES[self as usize]
    }

    /// Human-readable label, also used as the audit `entityType`.
    pub fn label(self) -> &'static str {
        self.info().label
    }

    /// Local collection name (camelCase).
    pub fn local_collection(self) -> &'static str {
        self.info().local
    }

    /// Remote table name (snake_case).
    pub fn remote_table(self) -> &'static str {
        self.info().remote
    }

    /// True if the kind holds at most one row per owner.
    pub fn is_singleton(self) -> bool {
        self.info().singleton
    }

    /// True if records carry a comparable `updatedAt`.
    pub fn has_timestamp(self) -> bool {
        self.info().has_timestamp
    }

    /// True if local records of this kind may be deleted by reconciliation.
    pub fn supports_delete(self) -> bool {
        self.info().supports_delete
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.label() == s)
            .ok_or_else(|| ModelError::UnknownKind(s.to_string()))
    }
}

/// Static registry metadata for one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableInfo {
    /// The kind this entry describes.
    pub kind: EntityKind,
    /// Label used in audit entries and messages.
    pub label: &'static str,
    /// Local collection name.
    pub local: &'static str,
    /// Remote table name.
    pub remote: &'static str,
    /// At most one row per owner.
    pub singleton: bool,
    /// Records carry `updatedAt`.
    pub has_timestamp: bool,
    /// Orphan deletion is allowed.
    pub supports_delete: bool,
    /// Field holding a human-readable name, if any.
    pub display_field: Option<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_matches_kind() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.info().kind, kind);
        }
    }

    #[test]
    fn label_roundtrip() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.label().parse::<EntityKind>().unwrap(), kind);
        }
        assert!("Widget".parse::<EntityKind>().is_err());
    }

    #[test]
    fn catalog_flags() {
        assert!(EntityKind::CostSettings.is_singleton());
        assert!(EntityKind::Inventory.is_singleton());
        assert!(!EntityKind::Job.is_singleton());

        assert!(!EntityKind::JobCategory.has_timestamp());
        assert!(EntityKind::System.has_timestamp());

        assert!(EntityKind::Laborer.supports_delete());
        assert!(!EntityKind::Material.supports_delete());
        assert!(!EntityKind::CostSettings.supports_delete());
    }
}
