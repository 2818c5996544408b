//! # HTTP Server Module
//!
//! Axum server exposing the item store.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/items/` - Create and list items
//! - `/items/{id}` - Read, replace and delete one item

pub mod config;
pub mod errors;
pub mod health_routes;
pub mod item_routes;
pub mod middleware;
pub mod server;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult};
pub use server::{build_router, HttpServer};
