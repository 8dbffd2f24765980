//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Fallback content type for files without a known type.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file whose bytes live in remote storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FileRecord {
    /// Local numeric identifier.
    pub id: i64,
    /// Owning user.
    pub owner_id: Uuid,
    /// File name (including extension).
    pub name: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Declared content type.
    pub content_type: Option<String>,
    /// Remote file ID. Never changes after creation.
    pub remote_id: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Containing folder (None = the user's root).
    pub folder_id: Option<i64>,
    /// When the upload completed.
    pub uploaded_at: DateTime<Utc>,
}

impl FileRecord {
    /// Content type to serve the file with.
    pub fn effective_content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

/// Data required to persist a new file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFileRecord {
    /// Owning user.
    pub owner_id: Uuid,
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Declared content type.
    pub content_type: Option<String>,
    /// Remote ID returned by the upload call.
    pub remote_id: String,
    /// Description.
    pub description: Option<String>,
    /// Containing folder.
    pub folder_id: Option<i64>,
}
