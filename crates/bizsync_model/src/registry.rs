//! Static mapping between local collections and remote tables.
//!
//! Both directions are total over the catalog. Looking up a name that was
//! never registered is a configuration error, reported as
//! [`ModelError::UnknownCollection`] or [`ModelError::UnknownTable`].

use crate::error::{ModelError, ModelResult};
use crate::kind::{EntityKind, TableInfo};

/// The catalog, indexed by `EntityKind as usize`.
pub static TABLES: [TableInfo; 7] = [
    TableInfo {
        kind: EntityKind::System,
        label: "System",
        local: "systems",
        remote: "systems",
        singleton: false,
        has_timestamp: true,
        supports_delete: true,
        display_field: Some("name"),
    },
    TableInfo {
        kind: EntityKind::Job,
        label: "Job",
        local: "jobs",
        remote: "jobs",
        singleton: false,
        has_timestamp: true,
        supports_delete: true,
        display_field: Some("name"),
    },
    TableInfo {
        kind: EntityKind::Laborer,
        label: "Laborer",
        local: "laborers",
        remote: "laborers",
        singleton: false,
        has_timestamp: true,
        supports_delete: true,
        display_field: Some("name"),
    },
    TableInfo {
        kind: EntityKind::Material,
        label: "Material",
        local: "materials",
        remote: "materials",
        singleton: false,
        has_timestamp: true,
        supports_delete: false,
        display_field: Some("name"),
    },
    TableInfo {
        kind: EntityKind::JobCategory,
        label: "JobCategory",
        local: "jobCategories",
        remote: "job_categories",
        singleton: false,
        has_timestamp: false,
        supports_delete: false,
        display_field: Some("name"),
    },
    TableInfo {
        kind: EntityKind::CostSettings,
        label: "CostSettings",
        local: "costSettings",
        remote: "cost_settings",
        singleton: true,
        has_timestamp: true,
        supports_delete: false,
        display_field: None,
    },
    TableInfo {
        kind: EntityKind::Inventory,
        label: "Inventory",
        local: "inventory",
        remote: "inventory_summary",
        singleton: true,
        has_timestamp: true,
        supports_delete: false,
        display_field: None,
    },
];

/// Returns every registry entry in registry order.
pub fn tables() -> &'static [TableInfo] {
    &TABLES
}

/// Remote table name for a local collection.
pub fn remote_name(local_collection: &str) -> ModelResult<&'static str> {
    kind_for_collection(local_collection).map(EntityKind::remote_table)
}

/// Local collection name for a remote table.
pub fn local_collection(remote_name: &str) -> ModelResult<&'static str> {
    kind_for_table(remote_name).map(EntityKind::local_collection)
}

/// Resolves a local collection name to its kind.
pub fn kind_for_collection(local_collection: &str) -> ModelResult<EntityKind> {
    TABLES
        .iter()
        .find(|t| t.local == local_collection)
        .map(|t| t.kind)
        .ok_or_else(|| ModelError::UnknownCollection(local_collection.to_string()))
}

/// Resolves a remote table name to its kind.
pub fn kind_for_table(remote_name: &str) -> ModelResult<EntityKind> {
    TABLES
        .iter()
        .find(|t| t.remote == remote_name)
        .map(|t| t.kind)
        .ok_or_else(|| ModelError::UnknownTable(remote_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_matches_kind_discriminants() {
        for (index, table) in TABLES.iter().enumerate() {
            assert_eq!(table.kind as usize, index);
        }
    }

    #[test]
    fn bijection_over_catalog() {
        for table in tables() {
            let remote = remote_name(table.local).unwrap();
            assert_eq!(remote, table.remote);
            assert_eq!(local_collection(remote).unwrap(), table.local);
        }
    }

    #[test]
    fn renamed_tables() {
        assert_eq!(remote_name("jobCategories").unwrap(), "job_categories");
        assert_eq!(remote_name("inventory").unwrap(), "inventory_summary");
        assert_eq!(local_collection("cost_settings").unwrap(), "costSettings");
    }

    #[test]
    fn unregistered_names_fail_fast() {
        assert_eq!(
            remote_name("widgets"),
            Err(ModelError::UnknownCollection("widgets".into()))
        );
        assert_eq!(
            local_collection("job_categories_v2"),
            Err(ModelError::UnknownTable("job_categories_v2".into()))
        );
        // Names are not interchangeable between the two sides.
        assert!(remote_name("cost_settings").is_err());
    }
}
