//! # drivehub-storage
//!
//! Remote storage implementations for DriveHub: a Google Drive v3 REST
//! client authenticated with a service account, an in-memory store for
//! development and tests, and the lazily initialized [`RemoteClient`]
//! handle the services share.

pub mod client;
pub mod drive;
pub mod memory;

pub use client::RemoteClient;
pub use drive::GoogleDriveClient;
pub use memory::{MemoryRemote, RemoteOp};
