//! Upload staging.
//!
//! Incoming file bodies are written to temporary files before they are
//! forwarded to remote storage. A staged file is removed when it is
//! dropped, whichever way the upload ends.

pub mod content_type;
pub mod staging;

pub use content_type::resolve_content_type;
pub use staging::{StagedFile, UploadStager};
