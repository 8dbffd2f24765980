//! Folder/file mirror between the record stores and remote storage.
//!
//! Every operation runs for one user at a time and follows the same
//! order: approval gate, ownership checks, remote client, remote call,
//! local write. A record is only written after its remote object was
//! created, and only deleted after its remote object was deleted.
//! There is no locking across requests; two concurrent first uploads
//! for the same user can each create a root folder, and the last one
//! recorded wins.

pub mod files;
pub mod folders;
pub mod outcome;
pub mod verify;

use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use drivehub_core::config::UploadConfig;
use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_core::traits::remote::RemoteStorage;
use drivehub_database::Stores;
use drivehub_entity::profile::Profile;
use drivehub_storage::RemoteClient;

use crate::context::RequestContext;

pub use self::outcome::{
    BatchReport, DashboardView, DownloadResult, FolderListing, MirrorOutcome, UploadFailure,
    UploadRequest, UploadSummary, VerifyReport,
};

/// Notice shown to users whose account is not yet approved.
pub const PENDING_NOTICE: &str =
    "Your account is pending approval. An administrator will review it shortly.";

/// Keeps local folder/file records and remote objects in step.
#[derive(Debug, Clone)]
pub struct MirrorService {
    /// Record stores.
    stores: Stores,
    /// Shared remote storage handle.
    remote: Arc<RemoteClient>,
    /// Upload limits.
    upload: UploadConfig,
}

impl MirrorService {
    /// Creates a new mirror service.
    pub fn new(stores: Stores, remote: Arc<RemoteClient>, upload: UploadConfig) -> Self {
        Self {
            stores,
            remote,
            upload,
        }
    }

    /// Upload limits in effect.
    pub fn upload_config(&self) -> &UploadConfig {
        &self.upload
    }

    /// Load the caller's profile and reject the call unless approved.
    async fn require_approved(&self, ctx: &RequestContext) -> AppResult<Profile> {
        let profile = self.stores.profiles.find_by_user(ctx.user_id).await?;
        match profile {
            Some(profile) if profile.is_approved => Ok(profile),
            _ => Err(AppError::authorization(PENDING_NOTICE)),
        }
    }

    /// The remote provider; `RemoteUnavailable` if it cannot be built.
    async fn provider(&self) -> AppResult<Arc<dyn RemoteStorage>> {
        self.remote.get().await.map_err(|e| {
            if e.kind == ErrorKind::RemoteUnavailable {
                e
            } else {
                AppError::with_source(
                    ErrorKind::RemoteUnavailable,
                    "Remote storage is not available",
                    e,
                )
            }
        })
    }

    /// Remote ID of the user's root folder, creating it if unset.
    ///
    /// `Failed` when the remote create call fails; the profile is then
    /// left untouched.
    async fn ensure_root(
        &self,
        user_id: Uuid,
        username: &str,
        profile: &Profile,
        remote: &dyn RemoteStorage,
    ) -> AppResult<MirrorOutcome<String>> {
        if let Some(root) = profile.remote_root_id.as_deref() {
            return Ok(MirrorOutcome::completed(root.to_string()));
        }

        let name = self.remote.config().root_folder_name(username);
        let created = remote
            .create_folder(&name, None, profile.share_email.as_deref())
            .await;
        let root = match absorb(created, "create root folder", user_id)? {
            Ok(root) => root,
            Err(message) => return Ok(MirrorOutcome::failed(message)),
        };

        self.stores.profiles.set_remote_root(user_id, &root).await?;
        info!(user_id = %user_id, remote_id = %root, name = %name, "Root folder created");
        Ok(MirrorOutcome::completed(root))
    }

    /// Create the root folder of an already approved user.
    ///
    /// Used when an administrator approves an account.
    pub async fn ensure_root_for(
        &self,
        user_id: Uuid,
        username: &str,
    ) -> AppResult<MirrorOutcome<String>> {
        let profile = self
            .stores
            .profiles
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Profile not found"))?;
        if let Some(root) = profile.remote_root_id.as_deref() {
            return Ok(MirrorOutcome::completed(root.to_string()));
        }
        let remote = self.provider().await?;
        self.ensure_root(user_id, username, &profile, remote.as_ref())
            .await
    }
}

/// Separate remote call failures from other errors.
///
/// A `RemoteCall` failure is logged with its chain and becomes
/// `Ok(Err(message))` for the user; any other error propagates.
fn absorb<T>(result: AppResult<T>, op: &str, user_id: Uuid) -> AppResult<Result<T, String>> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(e) if e.kind == ErrorKind::RemoteCall => {
            error!(user_id = %user_id, op = %op, error = %e.chain(), "Remote call failed");
            Ok(Err(format!("Could not {op}. Please try again later.")))
        }
        Err(e) => Err(e),
    }
}
