//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A folder that exists both locally and in remote storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FolderRecord {
    /// Local numeric identifier.
    pub id: i64,
    /// Owning user.
    pub owner_id: Uuid,
    /// Display name.
    pub name: String,
    /// Remote folder ID. Never changes after creation.
    pub remote_id: String,
    /// Parent folder (None = the user's root).
    pub parent_id: Option<i64>,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
}

impl FolderRecord {
    /// Check if this folder sits directly under the user's root.
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Data required to persist a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRecord {
    /// Owning user.
    pub owner_id: Uuid,
    /// Display name.
    pub name: String,
    /// Remote ID returned by the remote create call.
    pub remote_id: String,
    /// Parent folder.
    pub parent_id: Option<i64>,
}
