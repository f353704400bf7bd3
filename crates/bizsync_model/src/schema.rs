//! Per-kind field schemas.
//!
//! A schema lists the fields the import validator checks. Required fields
//! must be present with the right type; optional fields are checked only
//! when present and non-null. Anything not listed passes through.

use crate::kind::EntityKind;
use crate::record::json_type_name;
use crate::timestamp::parse_timestamp;
use serde_json::Value;

/// Allowed values of `Job.status`.
pub const JOB_STATUSES: &[&str] = &["Won", "Lost", "Pending"];

/// Expected type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// String holding a parseable ISO-8601 date or date-time.
    IsoDate,
    /// String restricted to a fixed value set.
    Enum(&'static [&'static str]),
}

impl FieldKind {
    /// Checks a value against this kind.
    ///
    /// Returns a short description of the mismatch on failure.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (FieldKind::String, Value::String(_))
            | (FieldKind::Number, Value::Number(_))
            | (FieldKind::Boolean, Value::Bool(_)) => Ok(()),
            (FieldKind::IsoDate, Value::String(s)) => {
                if parse_timestamp(s).is_some() {
                    Ok(())
                } else {
                    Err(format!("invalid date {s:?}"))
                }
            }
            (FieldKind::Enum(allowed), Value::String(s)) => {
                if allowed.contains(&s.as_str()) {
                    Ok(())
                } else {
                    Err(format!(
                        "expected one of {}, got {s:?}",
                        allowed.join(", ")
                    ))
                }
            }
            (kind, other) => Err(format!(
                "expected {}, got {}",
                kind.describe(),
                json_type_name(other)
            )),
        }
    }

    /// Name of the expected type.
    pub fn describe(&self) -> &'static str {
        match self {
            FieldKind::String | FieldKind::Enum(_) => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::IsoDate => "ISO date string",
        }
    }
}

/// One field of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Local (camelCase) field name.
    pub name: &'static str,
    /// Expected type.
    pub kind: FieldKind,
    /// Must be present.
    pub required: bool,
}

const fn required(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: true,
    }
}

const fn optional(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: false,
    }
}

static SYSTEM: &[FieldSpec] = &[
    required("id", FieldKind::String),
    required("name", FieldKind::String),
    required("updatedAt", FieldKind::IsoDate),
    optional("description", FieldKind::String),
    optional("basePrice", FieldKind::Number),
];

static JOB: &[FieldSpec] = &[
    required("id", FieldKind::String),
    required("name", FieldKind::String),
    required("status", FieldKind::Enum(JOB_STATUSES)),
    required("updatedAt", FieldKind::IsoDate),
    optional("systemId", FieldKind::String),
    optional("customerName", FieldKind::String),
    optional("price", FieldKind::Number),
    optional("squareFeet", FieldKind::Number),
    optional("jobDate", FieldKind::IsoDate),
];

static LABORER: &[FieldSpec] = &[
    required("id", FieldKind::String),
    required("name", FieldKind::String),
    required("hourlyRate", FieldKind::Number),
    required("updatedAt", FieldKind::IsoDate),
    optional("active", FieldKind::Boolean),
];

static MATERIAL: &[FieldSpec] = &[
    required("id", FieldKind::String),
    required("name", FieldKind::String),
    required("unitCost", FieldKind::Number),
    required("updatedAt", FieldKind::IsoDate),
    optional("unit", FieldKind::String),
];

static JOB_CATEGORY: &[FieldSpec] = &[
    required("id", FieldKind::String),
    required("name", FieldKind::String),
];

static COST_SETTINGS: &[FieldSpec] = &[
    required("id", FieldKind::String),
    required("updatedAt", FieldKind::IsoDate),
    optional("overheadPercent", FieldKind::Number),
    optional("laborBurdenPercent", FieldKind::Number),
    optional("targetMarginPercent", FieldKind::Number),
];

static INVENTORY: &[FieldSpec] = &[
    required("id", FieldKind::String),
    required("updatedAt", FieldKind::IsoDate),
    optional("totalValue", FieldKind::Number),
    optional("itemCount", FieldKind::Number),
];

/// Returns the schema for a kind.
pub fn schema(kind: EntityKind) -> &'static [FieldSpec] {
    match kind {
        EntityKind::System => SYSTEM,
        EntityKind::Job => JOB,
        EntityKind::Laborer => LABORER,
        EntityKind::Material => MATERIAL,
        EntityKind::JobCategory => JOB_CATEGORY,
        EntityKind::CostSettings => COST_SETTINGS,
        EntityKind::Inventory => INVENTORY,
    }
}

/// Every field name known to any schema, plus `createdAt`.
pub fn known_fields() -> impl Iterator<Item = &'static str> {
    EntityKind::ALL
        .into_iter()
        .flat_map(|kind| schema(kind).iter().map(|spec| spec.name))
        .chain(std::iter::once("createdAt"))
}
