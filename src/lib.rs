//! itemstore - a durable item record store served over HTTP
//!
//! Create, read, list, replace and delete items through a small JSON API
//! backed by an append-only, checksummed table file.

pub mod cli;
pub mod http_server;
pub mod item;
pub mod observability;
pub mod schema;
pub mod session;
pub mod storage;
