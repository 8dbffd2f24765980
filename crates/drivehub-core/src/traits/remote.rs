//! Remote object storage trait.
//!
//! The remote service addresses folders and files by opaque string IDs.
//! Implementations live in `drivehub-storage`.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// MIME type the remote service uses to mark folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Whether a remote object is a folder or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteKind {
    /// A folder.
    Folder,
    /// A regular file.
    File,
}

impl RemoteKind {
    /// Classify a remote object by its MIME type.
    pub fn from_mime_type(mime_type: &str) -> Self {
        if mime_type == FOLDER_MIME_TYPE {
            Self::Folder
        } else {
            Self::File
        }
    }
}

/// One entry of a remote folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteObject {
    /// Opaque remote ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Folder or file.
    pub kind: RemoteKind,
    /// Size in bytes (files only).
    pub size: Option<u64>,
    /// When the object was created remotely.
    pub created_time: Option<DateTime<Utc>>,
}

/// Operations consumed from the remote storage service.
///
/// `share_email`, when given, grants that address write access to the
/// newly created object. Every method returns `ErrorKind::RemoteCall` on
/// failure; callers decide whether to propagate or absorb it.
#[async_trait]
pub trait RemoteStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "google_drive").
    fn provider_type(&self) -> &str;

    /// Create a folder and return its remote ID.
    async fn create_folder(
        &self,
        name: &str,
        parent_id: Option<&str>,
        share_email: Option<&str>,
    ) -> AppResult<String>;

    /// Upload a file and return its remote ID.
    async fn upload_file(
        &self,
        data: Bytes,
        name: &str,
        content_type: &str,
        parent_id: &str,
        share_email: Option<&str>,
    ) -> AppResult<String>;

    /// Download a file fully into memory.
    async fn download_file(&self, id: &str) -> AppResult<Bytes>;

    /// Delete a folder or file. Deleting a folder removes its children.
    async fn delete(&self, id: &str) -> AppResult<()>;

    /// List the direct children of a folder.
    async fn list_children(&self, parent_id: &str) -> AppResult<Vec<RemoteObject>>;
}
