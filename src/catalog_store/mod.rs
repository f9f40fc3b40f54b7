mod memory_store;
mod models;
mod schema;
mod store;
mod trait_def;

pub use memory_store::InMemoryComponentStore;
pub use models::*;
pub use schema::CATALOG_VERSIONED_SCHEMAS;
pub use store::SqliteComponentStore;
pub use trait_def::{ComponentStore, WritableComponentStore};
