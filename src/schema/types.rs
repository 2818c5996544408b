//! Schema type definitions
//!
//! Supported field types:
//! - string: UTF-8 string
//! - float: any JSON number, read as 64-bit floating point
//! - int: 64-bit signed integer (query and path parameters)

use serde::{Deserialize, Serialize};

/// Supported field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// 64-bit floating point, integers accepted
    Float,
    /// 64-bit signed integer
    Int,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Float => "float",
            FieldType::Int => "int",
        }
    }

    /// Returns the violation tag reported when a value has the wrong type
    pub fn mismatch_tag(&self) -> &'static str {
        match self {
            FieldType::String => "string_type",
            FieldType::Float => "float_type",
            FieldType::Int => "int_parsing",
        }
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name as it appears in the payload
    pub name: String,
    /// Field data type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether the field must be present and non-null
    pub required: bool,
}

impl FieldDef {
    /// Create a required string field
    pub fn required_string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String, true)
    }

    /// Create an optional (nullable) string field
    pub fn optional_string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String, false)
    }

    /// Create a required float field
    pub fn required_float(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Float, true)
    }

    /// Create an optional (nullable) float field
    pub fn optional_float(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Float, false)
    }

    fn new(name: impl Into<String>, field_type: FieldType, required: bool) -> Self {
        Self {
            name: name.into(),
            field_type,
            required,
        }
    }
}

/// Complete schema definition for one payload type.
///
/// Fields are kept in declaration order so violations are reported in a
/// stable order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema name, logged with validation failures
    pub name: String,
    /// Field definitions in declaration order
    pub fields: Vec<FieldDef>,
}

impl Schema {
    /// Create a new schema
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_constructors() {
        let name = FieldDef::required_string("name");
        assert_eq!(name.field_type, FieldType::String);
        assert!(name.required);

        let tax = FieldDef::optional_float("tax");
        assert_eq!(tax.field_type, FieldType::Float);
        assert!(!tax.required);
    }

    #[test]
    fn test_schema_keeps_declaration_order() {
        let schema = Schema::new(
            "thing",
            vec![FieldDef::required_string("b"), FieldDef::optional_float("a")],
        );
        let names: Vec<&str> = schema.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
