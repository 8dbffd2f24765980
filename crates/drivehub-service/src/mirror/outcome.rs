//! Result values returned across the mirror boundary.

use serde::{Deserialize, Serialize};

use drivehub_core::config::UploadConfig;
use drivehub_core::traits::remote::RemoteObject;
use drivehub_entity::file::FileRecord;
use drivehub_entity::folder::{Breadcrumb, FolderRecord};

/// Coarse result of an operation that calls remote storage.
///
/// A failed remote call is not an error for the caller: it becomes
/// `Failed` with a message suitable for showing to the user, and the
/// details go to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MirrorOutcome<T> {
    /// The remote call and the local write both happened.
    Completed {
        /// Operation result.
        value: T,
    },
    /// The remote call failed; nothing was written locally.
    Failed {
        /// User-facing explanation.
        message: String,
    },
}

impl<T> MirrorOutcome<T> {
    /// Wrap a successful value.
    pub fn completed(value: T) -> Self {
        Self::Completed { value }
    }

    /// A failure with a user-facing message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Whether the operation completed.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// The value, if completed.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Completed { value } => Some(value),
            Self::Failed { .. } => None,
        }
    }

    /// Consume into the value, if completed.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Completed { value } => Some(value),
            Self::Failed { .. } => None,
        }
    }

    /// The failure message, if failed.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Completed { .. } => None,
            Self::Failed { message } => Some(message),
        }
    }

    /// Map the completed value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> MirrorOutcome<U> {
        match self {
            Self::Completed { value } => MirrorOutcome::Completed { value: f(value) },
            Self::Failed { message } => MirrorOutcome::Failed { message },
        }
    }
}

/// One file of a batch that did not make it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFailure {
    /// File name as submitted.
    pub name: String,
    /// Why it failed.
    pub reason: String,
}

/// Per-file accounting for an upload batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Files uploaded and recorded.
    pub succeeded: usize,
    /// Files that failed.
    pub failed: usize,
    /// Records created, in submission order.
    pub files: Vec<FileRecord>,
    /// Failures, in submission order.
    pub failures: Vec<UploadFailure>,
}

impl BatchReport {
    pub(crate) fn record_success(&mut self, file: FileRecord) {
        self.succeeded += 1;
        self.files.push(file);
    }

    pub(crate) fn record_failure(&mut self, name: &str, reason: impl Into<String>) {
        self.failed += 1;
        self.failures.push(UploadFailure {
            name: name.to_string(),
            reason: reason.into(),
        });
    }

    /// Human-readable summary line.
    pub fn summary(&self) -> String {
        match (self.succeeded, self.failed) {
            (n, 0) => format!("Successfully uploaded {n} file(s)."),
            (0, f) => format!("Failed to upload {f} file(s)."),
            (n, f) => format!("Uploaded {n} file(s); {f} failed."),
        }
    }
}

/// Input of the combined upload form.
#[derive(Debug, Default)]
pub struct UploadRequest {
    /// Staged file bodies.
    pub files: Vec<crate::upload::StagedFile>,
    /// Description applied to every uploaded file.
    pub description: Option<String>,
    /// Name of a folder to create first.
    pub folder_name: Option<String>,
    /// Parent of the new folder, or destination of the files when no
    /// folder is created.
    pub parent_id: Option<i64>,
}

impl UploadRequest {
    pub(crate) fn check_limits(&self, config: &UploadConfig) -> Result<(), String> {
        let has_folder = self
            .folder_name
            .as_deref()
            .is_some_and(|n| !n.trim().is_empty());
        if self.files.is_empty() && !has_folder {
            return Err("You must either upload files or create a folder.".to_string());
        }
        if self.files.len() > config.max_files_per_batch {
            return Err(format!(
                "At most {} files can be uploaded at once",
                config.max_files_per_batch
            ));
        }
        Ok(())
    }
}

/// What the upload form did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadSummary {
    /// Folder created by the request, if one was requested and created.
    pub folder: Option<FolderRecord>,
    /// File accounting, if files were submitted and attempted.
    pub report: Option<BatchReport>,
    /// Notices for the user, in order.
    pub messages: Vec<String>,
}

/// Bytes of a downloaded file with what is needed to serve them.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    /// The file record.
    pub file: FileRecord,
    /// File content.
    pub data: bytes::Bytes,
    /// Content type to serve.
    pub content_type: String,
}

/// Local contents of one folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderListing {
    /// The folder listed (None = the user's root).
    pub folder: Option<FolderRecord>,
    /// Sub-folders, by name.
    pub folders: Vec<FolderRecord>,
    /// Files, newest first.
    pub files: Vec<FileRecord>,
    /// Ancestors from the top level down to the folder.
    pub breadcrumbs: Vec<Breadcrumb>,
    /// Full path of the folder ("" for the root).
    pub path: String,
}

/// What a signed-in user sees on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DashboardView {
    /// Account awaiting approval.
    Pending {
        /// Notice for the user.
        message: String,
    },
    /// Approved account with the folder listing.
    Ready {
        /// The listing.
        listing: FolderListing,
    },
}

/// Differences between local records and a remote folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyReport {
    /// The remote folder that was listed.
    pub remote_id: Option<String>,
    /// Local folders whose remote object is gone.
    pub stale_folders: Vec<FolderRecord>,
    /// Local files whose remote object is gone.
    pub stale_files: Vec<FileRecord>,
    /// Remote objects with no local record.
    pub untracked: Vec<RemoteObject>,
}

impl VerifyReport {
    /// Whether local and remote agree.
    pub fn is_consistent(&self) -> bool {
        self.stale_folders.is_empty() && self.stale_files.is_empty() && self.untracked.is_empty()
    }
}
