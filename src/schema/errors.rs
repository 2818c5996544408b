//! Schema error types
//!
//! A `SchemaError` carries every violation found in one payload, so a
//! client sees all of its mistakes in a single 422 response.

use std::fmt;

use serde::Serialize;

/// Where the offending value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// JSON request body
    Body,
    /// URL query string
    Query,
    /// URL path segment
    Path,
}

impl Location {
    /// Returns the location name used in error bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Body => "body",
            Location::Query => "query",
            Location::Path => "path",
        }
    }
}

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDetails {
    /// Location followed by the field name, e.g. `["body", "price"]`
    pub loc: Vec<String>,
    /// Human-readable message
    pub msg: String,
    /// Machine-readable violation tag
    #[serde(rename = "type")]
    pub error_type: String,
}

impl ValidationDetails {
    pub fn new(
        location: Location,
        field: Option<&str>,
        msg: impl Into<String>,
        error_type: impl Into<String>,
    ) -> Self {
        let mut loc = vec![location.as_str().to_string()];
        if let Some(field) = field {
            loc.push(field.to_string());
        }
        Self {
            loc,
            msg: msg.into(),
            error_type: error_type.into(),
        }
    }

    pub fn missing_field(location: Location, field: &str) -> Self {
        Self::new(location, Some(field), "field required", "missing")
    }

    pub fn type_mismatch(location: Location, field: &str, expected: &str, tag: &str) -> Self {
        Self::new(
            location,
            Some(field),
            format!("value is not a valid {}", expected),
            tag,
        )
    }

    pub fn below_minimum(location: Location, field: &str, minimum: i64) -> Self {
        Self::new(
            location,
            Some(field),
            format!("ensure this value is greater than or equal to {}", minimum),
            "greater_than_equal",
        )
    }

    pub fn invalid_json(reason: impl fmt::Display) -> Self {
        Self::new(
            Location::Body,
            None,
            format!("invalid JSON: {}", reason),
            "json_invalid",
        )
    }

    pub fn not_an_object(actual: &str) -> Self {
        Self::new(
            Location::Body,
            None,
            format!("expected a JSON object, got {}", actual),
            "model_type",
        )
    }

    /// Returns the dotted path of the offending value
    pub fn path(&self) -> String {
        self.loc.join(".")
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path(), self.msg)
    }
}

/// Schema validation failure with one or more violations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    violations: Vec<ValidationDetails>,
}

impl SchemaError {
    /// Create an error from a list of violations
    pub fn new(violations: Vec<ValidationDetails>) -> Self {
        Self { violations }
    }

    /// Create an error with a single violation
    pub fn single(details: ValidationDetails) -> Self {
        Self {
            violations: vec![details],
        }
    }

    /// Returns the violations in the order they were found
    pub fn violations(&self) -> &[ValidationDetails] {
        &self.violations
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.violations.len())?;
        for details in &self.violations {
            write!(f, "; {}", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_serializes_with_location() {
        let details = ValidationDetails::missing_field(Location::Body, "name");
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["loc"], serde_json::json!(["body", "name"]));
        assert_eq!(json["type"], "missing");
        assert_eq!(json["msg"], "field required");
    }

    #[test]
    fn test_display_lists_every_violation() {
        let err = SchemaError::new(vec![
            ValidationDetails::missing_field(Location::Body, "name"),
            ValidationDetails::missing_field(Location::Body, "price"),
        ]);
        let display = err.to_string();
        assert!(display.starts_with("2 validation error(s)"));
        assert!(display.contains("body.name"));
        assert!(display.contains("body.price"));
    }

    #[test]
    fn test_root_error_has_no_field() {
        let details = ValidationDetails::invalid_json("EOF while parsing");
        assert_eq!(details.loc, vec!["body".to_string()]);
        assert_eq!(details.error_type, "json_invalid");
    }
}
