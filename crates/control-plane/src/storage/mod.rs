// Storage layer for the Gatherly control-plane
// Decision: Support both PostgreSQL (production) and in-memory (dev mode)
//
// - StorageBackend: enum dispatch over the two databases
// - BackendStore: implements the core store traits and publishes changes

pub mod backend;
pub mod memory;
pub mod models;
pub mod password;
pub mod repositories;
pub mod store;

pub use backend::StorageBackend;
pub use memory::InMemoryDatabase;
pub use models::*;
pub use repositories::Database;
pub use store::BackendStore;
