//! Schema validator for request payloads
//!
//! Validation semantics:
//! - All required fields are present and non-null
//! - Optional fields may be absent or null
//! - Field types match schema types; integers count as floats
//! - Undeclared fields are ignored
//! - Every violation is reported, not just the first
//!
//! Validation runs before any storage access and never mutates input.

use serde_json::{Map, Value};

use super::errors::{Location, SchemaError, SchemaResult, ValidationDetails};
use super::types::{FieldDef, FieldType, Schema};
use crate::observability::Logger;

/// Validator that enforces one schema on JSON bodies.
pub struct SchemaValidator<'a> {
    schema: &'a Schema,
}

impl<'a> SchemaValidator<'a> {
    /// Creates a new validator for the given schema.
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Parses raw body bytes and validates them.
    ///
    /// Returns the parsed document so callers can deserialize it without
    /// parsing twice.
    pub fn validate_bytes(&self, body: &[u8]) -> SchemaResult<Value> {
        let result = serde_json::from_slice::<Value>(body)
            .map_err(|e| SchemaError::single(ValidationDetails::invalid_json(e)))
            .and_then(|document| self.validate_document(&document).map(|()| document));

        if let Err(err) = &result {
            Logger::info(
                "SCHEMA_VALIDATION_FAILED",
                &[
                    ("schema", &self.schema.name),
                    ("violations", &err.violations().len().to_string()),
                ],
            );
        }
        result
    }

    /// Validates a JSON document against the schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` listing every violation if the document is not
    /// an object, misses required fields, or has mistyped fields.
    pub fn validate_document(&self, document: &Value) -> SchemaResult<()> {
        let obj = document.as_object().ok_or_else(|| {
            SchemaError::single(ValidationDetails::not_an_object(json_type_name(document)))
        })?;

        let violations = self.validate_object(obj);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::new(violations))
        }
    }

    fn validate_object(&self, obj: &Map<String, Value>) -> Vec<ValidationDetails> {
        self.schema
            .fields
            .iter()
            .filter_map(|field| validate_field(field, obj.get(&field.name)))
            .collect()
    }
}

fn validate_field(field: &FieldDef, value: Option<&Value>) -> Option<ValidationDetails> {
    match value {
        None | Some(Value::Null) if field.required => {
            Some(ValidationDetails::missing_field(Location::Body, &field.name))
        }
        None | Some(Value::Null) => None,
        Some(value) if matches_type(value, field.field_type) => None,
        Some(_) => Some(ValidationDetails::type_mismatch(
            Location::Body,
            &field.name,
            field.field_type.type_name(),
            field.field_type.mismatch_tag(),
        )),
    }
}

fn matches_type(value: &Value, expected: FieldType) -> bool {
    match expected {
        FieldType::String => value.is_string(),
        FieldType::Float => value.is_number(),
        FieldType::Int => value.is_i64(),
    }
}

/// Parses an integer parameter taken from the query string or path.
///
/// A missing value falls back to `default`; with no default it is reported
/// as missing. Values below `minimum` are rejected.
pub fn parse_int_param(
    location: Location,
    field: &str,
    raw: Option<&str>,
    default: Option<i64>,
    minimum: Option<i64>,
) -> Result<i64, ValidationDetails> {
    let value = match (raw, default) {
        (Some(raw), _) => raw.trim().parse::<i64>().map_err(|_| {
            ValidationDetails::type_mismatch(
                location,
                field,
                FieldType::Int.type_name(),
                FieldType::Int.mismatch_tag(),
            )
        })?,
        (None, Some(default)) => default,
        (None, None) => return Err(ValidationDetails::missing_field(location, field)),
    };

    match minimum {
        Some(min) if value < min => Err(ValidationDetails::below_minimum(location, field, min)),
        _ => Ok(value),
    }
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
