//! Session provider
//!
//! One [`ItemStore`] is opened at startup and injected into the HTTP layer.
//! Each request acquires its own [`Session`] from it; the session guard
//! releases itself on drop, so release happens on every exit path.
//!
//! Concurrent updates or deletes of the same id are not coordinated beyond
//! the store's per-operation mutex: the last writer wins.

mod guard;
mod store;

pub use guard::Session;
pub use store::ItemStore;
