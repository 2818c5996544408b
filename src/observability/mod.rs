//! Observability for itemstore
//!
//! Structured JSON logging, one line per event.
//!
//! ```ignore
//! use itemstore::observability::Logger;
//!
//! Logger::info("ITEM_CREATED", &[("item_id", "42")]);
//! ```

mod logger;

pub use logger::{Logger, Severity};
