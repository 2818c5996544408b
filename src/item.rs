//! Item payload and record types
//!
//! `ItemCreate` is the input shape for create and update. `Item` is the
//! stored record: the input fields plus the storage-assigned `id`.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::schema::{
    parse_int_param, FieldDef, Location, Schema, SchemaError, SchemaResult, SchemaValidator,
    ValidationDetails,
};

/// Default page size for list requests
pub const DEFAULT_LIMIT: i64 = 10;

/// Input payload for create and full-replacement update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub tax: Option<f64>,
}

impl ItemCreate {
    /// Schema enforced on create and update bodies
    pub fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new(
                "item",
                vec![
                    FieldDef::required_string("name"),
                    FieldDef::optional_string("description"),
                    FieldDef::required_float("price"),
                    FieldDef::optional_float("tax"),
                ],
            )
        })
    }

    /// Parses and validates a raw request body.
    pub fn from_body(body: &[u8]) -> SchemaResult<Self> {
        let document = SchemaValidator::new(Self::schema()).validate_bytes(body)?;
        serde_json::from_value(document)
            .map_err(|e| SchemaError::single(ValidationDetails::invalid_json(e)))
    }
}

/// Stored item, serialized with `id` first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    #[serde(flatten)]
    pub fields: ItemCreate,
}

impl Item {
    pub fn new(id: i64, fields: ItemCreate) -> Self {
        Self { id, fields }
    }
}

/// Offset/limit pagination for the list operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    pub skip: usize,
    pub limit: usize,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT as usize,
        }
    }
}

impl ListParams {
    /// Builds pagination from raw query parameters.
    ///
    /// Both values must be non-negative integers. Unknown parameters are
    /// ignored.
    pub fn from_query(query: &HashMap<String, String>) -> SchemaResult<Self> {
        let skip = parse_int_param(
            Location::Query,
            "skip",
            query.get("skip").map(String::as_str),
            Some(0),
            Some(0),
        );
        let limit = parse_int_param(
            Location::Query,
            "limit",
            query.get("limit").map(String::as_str),
            Some(DEFAULT_LIMIT),
            Some(0),
        );

        match (skip, limit) {
            (Ok(skip), Ok(limit)) => Ok(Self {
                skip: to_usize(skip),
                limit: to_usize(limit),
            }),
            (skip, limit) => Err(SchemaError::new(
                [skip.err(), limit.err()].into_iter().flatten().collect(),
            )),
        }
    }
}

fn to_usize(value: i64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Parses the `{item_id}` path segment.
pub fn parse_item_id(raw: &str) -> SchemaResult<i64> {
    parse_int_param(Location::Path, "item_id", Some(raw), None, None).map_err(SchemaError::single)
}
