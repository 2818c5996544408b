//! Schema layer for item payloads
//!
//! Schemas describe the shape of request payloads and are enforced before
//! any storage access.
//!
//! # Design Principles
//!
//! - Validation before storage
//! - No implicit type coercion
//! - Every violation reported with its location
//! - Deterministic validation order

mod errors;
mod types;
mod validator;

pub use errors::{Location, SchemaError, SchemaResult, ValidationDetails};
pub use types::{FieldDef, FieldType, Schema};
pub use validator::{parse_int_param, SchemaValidator};
