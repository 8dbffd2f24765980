//! # drivehub-database
//!
//! PostgreSQL connection management, the record-store traits the
//! services depend on, their PostgreSQL repositories, and an in-memory
//! implementation with the same cascade rules.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{FileStore, FolderStore, ProfileStore, Stores, UserStore};
