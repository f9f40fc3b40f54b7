//! Turntable Catalog Server Library
//!
//! Component catalog storage, the compatibility matching engine and the HTTP
//! server that exposes both.

pub mod catalog_store;
pub mod config;
pub mod matching;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use catalog_store::{ComponentStore, SqliteComponentStore, WritableComponentStore};
pub use matching::{MatchRequestHandler, MatchingSettings};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
