//! Local ↔ remote field naming.
//!
//! Local records use camelCase field names, the remote store uses
//! snake_case. Only recognized fields (those named by any schema) are
//! renamed; unknown fields pass through unchanged in both directions so
//! that newer clients can add fields without breaking older ones.

use crate::record::Record;
use crate::schema::known_fields;
use std::collections::{HashMap, HashSet};

/// Retired field names that must never be sent to the remote store.
pub const RETIRED_FIELDS: &[&str] = &[
    "legacyMarkup",
    "profitMarginOld",
    "laborCostCached",
    "syncStatus",
];

/// Bidirectional field-name translator.
#[derive(Debug, Clone)]
pub struct FieldMapper {
    to_remote: HashMap<String, String>,
    to_local: HashMap<String, String>,
    retired: HashSet<String>,
}

impl FieldMapper {
    /// Creates a mapper over every schema field.
    pub fn new() -> Self {
        let mut to_remote = HashMap::new();
        let mut to_local = HashMap::new();
        for field in known_fields() {
            let remote = camel_to_snake(field);
            to_local.insert(remote.clone(), field.to_string());
            to_remote.insert(field.to_string(), remote);
        }
        Self {
            to_remote,
            to_local,
            retired: RETIRED_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Adds an extra retired field.
    pub fn with_retired(mut self, field: impl Into<String>) -> Self {
        self.retired.insert(field.into());
        self
    }

    /// True if the field is on the deny-list.
    pub fn is_retired(&self, field: &str) -> bool {
        self.retired.contains(field)
    }

    /// Remote name of a local field (unchanged if unrecognized).
    pub fn remote_field<'a>(&'a self, local: &'a str) -> &'a str {
        self.to_remote.get(local).map(String::as_str).unwrap_or(local)
    }

    /// Local name of a remote field (unchanged if unrecognized).
    pub fn local_field<'a>(&'a self, remote: &'a str) -> &'a str {
        self.to_local.get(remote).map(String::as_str).unwrap_or(remote)
    }

    /// Converts a local record to remote naming, dropping retired fields.
    pub fn to_remote_shape(&self, record: &Record) -> Record {
        let mut out = Record::new();
        for (key, value) in record.fields() {
            if self.is_retired(key) {
                continue;
            }
            out.insert(self.remote_field(key), value.clone());
        }
        out
    }

    /// Converts a remote row to local naming.
    pub fn to_local_shape(&self, row: &Record) -> Record {
        let mut out = Record::new();
        for (key, value) in row.fields() {
            out.insert(self.local_field(key), value.clone());
        }
        out
    }
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// `squareFeet` → `square_feet`.
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn case_conversion() {
        assert_eq!(camel_to_snake("updatedAt"), "updated_at");
        assert_eq!(camel_to_snake("targetMarginPercent"), "target_margin_percent");
        assert_eq!(camel_to_snake("id"), "id");
    }

    #[test]
    fn to_remote_renames_and_strips() {
        let mapper = FieldMapper::new();
        let record = Record::new()
            .with("id", "J1")
            .with("squareFeet", 1200)
            .with("updatedAt", "2024-06-01T00:00:00Z")
            .with("legacyMarkup", 0.3)
            .with("someFutureField", "kept");

        let remote = mapper.to_remote_shape(&record);
        assert_eq!(remote.get("square_feet"), Some(&json!(1200)));
        assert_eq!(remote.get("updated_at"), Some(&json!("2024-06-01T00:00:00Z")));
        assert!(!remote.contains("legacyMarkup"));
        assert!(!remote.contains("legacy_markup"));
        assert_eq!(remote.get("someFutureField"), Some(&json!("kept")));
    }

    #[test]
    fn to_local_leaves_unknown_fields() {
        let mapper = FieldMapper::new();
        let row = Record::new()
            .with("id", "L1")
            .with("hourly_rate", 30)
            .with("mystery_column", true);

        let local = mapper.to_local_shape(&row);
        assert_eq!(local.get("hourlyRate"), Some(&json!(30)));
        assert_eq!(local.get("mystery_column"), Some(&json!(true)));
    }

    #[test]
    fn extra_retired_field() {
        let mapper = FieldMapper::new().with_retired("tmpNotes");
        let record = Record::new().with("id", "S1").with("tmpNotes", "x");
        assert!(!mapper.to_remote_shape(&record).contains("tmpNotes"));
    }

    proptest! {
        #[test]
        fn recognized_fields_roundtrip(values in proptest::collection::vec(any::<i64>(), 1..10)) {
            let mapper = FieldMapper::new();
            let fields: Vec<&str> = known_fields().collect();
            let mut record = Record::new();
            for (field, value) in fields.iter().zip(values) {
                record.insert(*field, value);
            }
            let back = mapper.to_local_shape(&mapper.to_remote_shape(&record));
            prop_assert_eq!(back, record);
        }
    }
}
