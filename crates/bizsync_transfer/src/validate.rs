//! Structural validation of untrusted bundles.
//!
//! One generic validator walks the bundle against the per-kind field
//! schemas and collects every violation. Only a bundle that passes can be
//! turned into a [`ValidatedBundle`], and only a `ValidatedBundle` can be
//! previewed or applied.

use crate::bundle::{BundleMetadata, EXPORT_VERSION, METADATA_KEY};
use crate::error::{TransferError, TransferResult};
use bizsync_model::schema::schema;
use bizsync_model::{json_type_name, parse_timestamp, EntityKind, Record, APP_NAME};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// One violation, qualified by its location in the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Location, e.g. `jobs[2].status` or `metadata.version`.
    pub path: String,
    /// What is wrong.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Outcome of validating a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// True iff `errors` is empty.
    pub valid: bool,
    /// Every violation found, in document order.
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// Builds a report from a list of errors.
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Returns true if any error is located at or under `path`.
    pub fn mentions(&self, path: &str) -> bool {
        self.errors.iter().any(|e| {
            e.path == path
                || e.path.starts_with(&format!("{path}."))
                || e.path.starts_with(&format!("{path}["))
        })
    }
}

/// Validates a bundle, collecting every violation.
pub fn validate_bundle(bundle: &Value) -> ValidationReport {
    let mut errors = Vec::new();

    let Some(root) = bundle.as_object() else {
        errors.push(ValidationError::new(
            "$",
            format!("expected object, got {}", json_type_name(bundle)),
        ));
        return ValidationReport::from_errors(errors);
    };

    check_metadata(root.get(METADATA_KEY), &mut errors);

    for kind in EntityKind::ALL {
        let key = kind.local_collection();
        match (kind.is_singleton(), root.get(key)) {
            (true, None | Some(Value::Null)) => {}
            (true, Some(value)) => check_record(kind, key, value, &mut errors),
            (false, None) => errors.push(ValidationError::new(key, "missing collection")),
            (false, Some(Value::Array(items))) => check_collection(kind, key, items, &mut errors),
            (false, Some(other)) => errors.push(ValidationError::new(
                key,
                format!("expected array, got {}", json_type_name(other)),
            )),
        }
    }

    ValidationReport::from_errors(errors)
}

fn check_metadata(metadata: Option<&Value>, errors: &mut Vec<ValidationError>) {
    let metadata = match metadata {
        Some(Value::Object(map)) => map,
        Some(other) => {
            errors.push(ValidationError::new(
                METADATA_KEY,
                format!("expected object, got {}", json_type_name(other)),
            ));
            return;
        }
        None => {
            errors.push(ValidationError::new(METADATA_KEY, "missing metadata"));
            return;
        }
    };

    match metadata.get("version") {
        Some(Value::Number(n)) => match n.as_u64() {
            Some(v) if (1..=u64::from(EXPORT_VERSION)).contains(&v) => {}
            Some(v) if v > u64::from(EXPORT_VERSION) => errors.push(ValidationError::new(
                "metadata.version",
                format!("unsupported version {v} (newest readable is {EXPORT_VERSION})"),
            )),
            _ => errors.push(ValidationError::new(
                "metadata.version",
                format!("expected a positive integer, got {n}"),
            )),
        },
        Some(other) => errors.push(ValidationError::new(
            "metadata.version",
            format!("expected number, got {}", json_type_name(other)),
        )),
        None => errors.push(ValidationError::new("metadata.version", "required field missing")),
    }

    match metadata.get("exportedAt") {
        Some(Value::String(s)) if parse_timestamp(s).is_some() => {}
        Some(Value::String(s)) => errors.push(ValidationError::new(
            "metadata.exportedAt",
            format!("invalid date {s:?}"),
        )),
        Some(other) => errors.push(ValidationError::new(
            "metadata.exportedAt",
            format!("expected ISO date string, got {}", json_type_name(other)),
        )),
        None => errors.push(ValidationError::new(
            "metadata.exportedAt",
            "required field missing",
        )),
    }

    match metadata.get("appName") {
        Some(Value::String(s)) if s == APP_NAME => {}
        Some(other) => errors.push(ValidationError::new(
            "metadata.appName",
            format!("expected {APP_NAME:?}, got {other}"),
        )),
        None => errors.push(ValidationError::new("metadata.appName", "required field missing")),
    }
}

fn check_collection(kind: EntityKind, key: &str, items: &[Value], errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for (index, item) in items.iter().enumerate() {
        let path = format!("{key}[{index}]");
        check_record(kind, &path, item, errors);
        if let Some(id) = item.get("id").and_then(Value::as_str) {
            if !seen.insert(id) {
                errors.push(ValidationError::new(
                    format!("{path}.id"),
                    format!("duplicate id {id:?}"),
                ));
            }
        }
    }
}

fn check_record(kind: EntityKind, path: &str, value: &Value, errors: &mut Vec<ValidationError>) {
    let Some(fields) = value.as_object() else {
        errors.push(ValidationError::new(
            path,
            format!("expected object, got {}", json_type_name(value)),
        ));
        return;
    };

    for spec in schema(kind) {
        match fields.get(spec.name) {
            None | Some(Value::Null) if spec.required => errors.push(ValidationError::new(
                format!("{path}.{}", spec.name),
                "required field missing",
            )),
            None | Some(Value::Null) => {}
            Some(value) => {
                if let Err(message) = spec.kind.check(value) {
                    errors.push(ValidationError::new(format!("{path}.{}", spec.name), message));
                }
            }
        }
    }
}

/// A bundle that passed validation, split into typed records.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBundle {
    metadata: BundleMetadata,
    collections: Vec<(EntityKind, Vec<Record>)>,
}

impl ValidatedBundle {
    /// Validates `bundle` and extracts its records.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Invalid`] with the complete report if any
    /// violation is found.
    pub fn parse(bundle: Value) -> TransferResult<Self> {
        let report = validate_bundle(&bundle);
        if !report.valid {
            return Err(TransferError::Invalid(report));
        }

        let Value::Object(mut root) = bundle else {
            return Err(TransferError::Invalid(report));
        };

        let metadata: BundleMetadata = serde_json::from_value(
            root.remove(METADATA_KEY).unwrap_or(Value::Null),
        )?;

        let mut collections = Vec::with_capacity(EntityKind::ALL.len());
        for kind in EntityKind::ALL {
            let records = match root.remove(kind.local_collection()) {
                Some(Value::Array(items)) => items.into_iter().filter_map(into_record).collect(),
                Some(Value::Object(map)) => vec![Record::from_map(map)],
                _ => Vec::new(),
            };
            collections.push((kind, records));
        }

        Ok(Self {
            metadata,
            collections,
        })
    }

    /// Returns the metadata.
    pub fn metadata(&self) -> &BundleMetadata {
        &self.metadata
    }

    /// Returns the records of one kind.
    pub fn records(&self, kind: EntityKind) -> &[Record] {
        self.collections
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, records)| records.as_slice())
            .unwrap_or(&[])
    }

    /// Iterates kinds in registry order with their records.
    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &[Record])> {
        self.collections
            .iter()
            .map(|(kind, records)| (*kind, records.as_slice()))
    }

    /// Total number of records.
    pub fn record_count(&self) -> usize {
        self.collections.iter().map(|(_, records)| records.len()).sum()
    }
}

fn into_record(value: Value) -> Option<Record> {
    match value {
        Value::Object(map) => Some(Record::from_map(map)),
        _ => None,
    }
}
