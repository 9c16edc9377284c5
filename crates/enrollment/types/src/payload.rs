//! Payload shapes: per-step schemas for captured enrollment data
//!
//! Each step declares the fields it captures as data, and one generic
//! routine validates a candidate payload against that shape. Validation
//! is purely structural (required fields present, types match); field
//! semantics are the caller's business.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Captured data for one step: field name → JSON value
pub type StepPayload = serde_json::Map<String, Value>;

// ── Field types ──────────────────────────────────────────────────────

/// Primitive type of a payload field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Free-form text
    Text,
    /// Whole number
    Integer,
    /// Any JSON number
    Number,
    /// True/false flag
    Boolean,
    /// Calendar date, ISO-8601 `YYYY-MM-DD`
    Date,
}

impl FieldType {
    /// Check whether a JSON value conforms to this type
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Text => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Date => value
                .as_str()
                .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok())
                .unwrap_or(false),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
        }
    }
}

// ── Field spec ───────────────────────────────────────────────────────

/// Declared type and optionality of a single payload field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Expected primitive type
    pub field_type: FieldType,
    /// Whether the field must be present
    pub required: bool,
}

// ── Payload shape ────────────────────────────────────────────────────

/// Schema for one step's captured data: field name → spec
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadShape {
    /// Declared fields, ordered by name
    pub fields: BTreeMap<String, FieldSpec>,
}

impl PayloadShape {
    /// Create an empty shape (accepts only an empty payload)
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required field
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(
            name.into(),
            FieldSpec {
                field_type,
                required: true,
            },
        );
        self
    }

    /// Declare an optional field
    pub fn optional_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(
            name.into(),
            FieldSpec {
                field_type,
                required: false,
            },
        );
        self
    }

    /// Number of declared fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Validate a candidate payload against this shape.
    ///
    /// Required fields must be present, every present field must match its
    /// declared type, and undeclared fields are rejected. Returns the first
    /// violation as a reason string; the caller decides how to surface it.
    pub fn validate(&self, payload: &StepPayload) -> Result<(), String> {
        for (name, spec) in &self.fields {
            match payload.get(name) {
                Some(value) => {
                    if !spec.field_type.matches(value) {
                        return Err(format!(
                            "field '{}' must be of type {}",
                            name,
                            spec.field_type.name()
                        ));
                    }
                }
                None => {
                    if spec.required {
                        return Err(format!("missing required field '{}'", name));
                    }
                }
            }
        }

        for name in payload.keys() {
            if !self.fields.contains_key(name) {
                return Err(format!("unknown field '{}'", name));
            }
        }

        Ok(())
    }
}
