//! Core traits defined in `drivehub-core` and implemented by other crates.

pub mod remote;

pub use remote::{RemoteKind, RemoteObject, RemoteStorage, FOLDER_MIME_TYPE};
