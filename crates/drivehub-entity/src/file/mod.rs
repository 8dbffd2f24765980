//! File domain entities.

pub mod model;

pub use model::{CreateFileRecord, DEFAULT_CONTENT_TYPE, FileRecord};
