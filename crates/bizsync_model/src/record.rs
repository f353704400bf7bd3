//! Schemaless entity records.

use crate::error::{ModelError, ModelResult};
use crate::kind::EntityKind;
use crate::timestamp::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the record identifier.
pub const ID_FIELD: &str = "id";
/// Field holding the last-modification timestamp (local naming).
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// A synchronizable record: a JSON object with at least an `id`.
///
/// Records are kept schemaless so that fields unknown to this version
/// survive a round trip through sync or import untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing JSON object.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Converts a JSON value into a record.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidRecord`] if the value is not an object.
    pub fn from_value(value: Value) -> ModelResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ModelError::invalid_record(format!(
                "expected object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the record id, if present and a string.
    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).and_then(Value::as_str)
    }

    /// Returns the record id or a [`ModelError::MissingId`].
    pub fn require_id(&self, kind: EntityKind) -> ModelResult<&str> {
        self.id().ok_or_else(|| ModelError::MissingId {
            kind: kind.label().to_string(),
        })
    }

    /// Raw `updatedAt` string.
    pub fn updated_at_raw(&self) -> Option<&str> {
        self.0.get(UPDATED_AT_FIELD).and_then(Value::as_str)
    }

    /// Parsed `updatedAt`; `None` if missing or unparseable.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at_raw().and_then(parse_timestamp)
    }

    /// Human-readable name used in plans and audit entries.
    ///
    /// Uses the kind's display field, falling back to the id, and for
    /// singletons to the kind label.
    pub fn display_name(&self, kind: EntityKind) -> String {
        let info = kind.info();
        if let Some(name) = info
            .display_field
            .and_then(|field| self.0.get(field))
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
        {
            return name.to_string();
        }
        if info.singleton {
            return info.label.to_string();
        }
        self.id().unwrap_or("<no id>").to_string()
    }

    /// Gets a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Sets a field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes a field.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// True if the field is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrows the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Unwraps into the underlying map.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Converts into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}

/// Short JSON type name used in error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_requires_object() {
        assert!(Record::from_value(json!({"id": "S1"})).is_ok());
        let err = Record::from_value(json!([1, 2])).unwrap_err();
        assert_eq!(err.to_string(), "invalid record: expected object, got array");
    }

    #[test]
    fn accessors() {
        let record = Record::new()
            .with("id", "S1")
            .with("name", "Epoxy Floor")
            .with("updatedAt", "2024-06-01T00:00:00Z");

        assert_eq!(record.id(), Some("S1"));
        assert_eq!(record.updated_at_raw(), Some("2024-06-01T00:00:00Z"));
        assert!(record.updated_at().is_some());
        assert_eq!(record.display_name(EntityKind::System), "Epoxy Floor");
    }

    #[test]
    fn non_string_id_is_missing() {
        let record = Record::new().with("id", 42);
        assert_eq!(record.id(), None);
        assert!(record.require_id(EntityKind::Job).is_err());
    }

    #[test]
    fn display_name_fallbacks() {
        let job = Record::new().with("id", "J1");
        assert_eq!(job.display_name(EntityKind::Job), "J1");

        let settings = Record::new().with("id", "cs");
        assert_eq!(settings.display_name(EntityKind::CostSettings), "CostSettings");
    }

    #[test]
    fn serializes_transparently() {
        let record = Record::new().with("id", "L1").with("hourlyRate", 32.5);
        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text, r#"{"id":"L1","hourlyRate":32.5}"#);
        let back: Record = serde_json::from_str(&text).unwrap();
        assert_eq!(back, record);
    }
}
