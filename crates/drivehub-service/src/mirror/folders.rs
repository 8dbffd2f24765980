//! Folder operations: create, delete, list.

use tracing::{error, info, warn};

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_entity::folder::{CreateFolderRecord, FolderRecord, FolderTree};

use super::{DashboardView, FolderListing, MirrorOutcome, MirrorService, PENDING_NOTICE, absorb};
use crate::context::RequestContext;

const MAX_FOLDER_NAME_LEN: usize = 255;

/// Trim and check a folder display name.
pub fn validate_folder_name(name: &str) -> AppResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Folder name cannot be empty"));
    }
    if name.contains('/') {
        return Err(AppError::validation("Folder name cannot contain '/'"));
    }
    if name.chars().count() > MAX_FOLDER_NAME_LEN {
        return Err(AppError::validation(format!(
            "Folder name cannot exceed {MAX_FOLDER_NAME_LEN} characters"
        )));
    }
    Ok(name)
}

impl MirrorService {
    /// Find a folder owned by the caller. Missing and foreign folders
    /// produce the same error.
    pub(crate) async fn owned_folder(
        &self,
        ctx: &RequestContext,
        folder_id: i64,
    ) -> AppResult<FolderRecord> {
        self.stores
            .folders
            .find_owned(ctx.user_id, folder_id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))
    }

    /// The caller's folders as an arena.
    pub(crate) async fn folder_tree(&self, ctx: &RequestContext) -> AppResult<FolderTree> {
        let folders = self.stores.folders.list_by_owner(ctx.user_id).await?;
        FolderTree::build(ctx.user_id, folders)
    }

    /// Create a folder under `parent_id` (None = the user's root).
    ///
    /// The remote folder is created first; the record is only written
    /// when that succeeds.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent_id: Option<i64>,
    ) -> AppResult<MirrorOutcome<FolderRecord>> {
        let profile = self.require_approved(ctx).await?;
        let name = validate_folder_name(name)?;

        let parent = match parent_id {
            Some(id) => {
                let parent = self.owned_folder(ctx, id).await?;
                self.folder_tree(ctx).await?.validate_parent(None, parent.id)?;
                Some(parent)
            }
            None => None,
        };

        let remote = self.provider().await?;
        let remote_parent = match &parent {
            Some(parent) => parent.remote_id.clone(),
            None => {
                match self
                    .ensure_root(ctx.user_id, &ctx.username, &profile, remote.as_ref())
                    .await?
                {
                    MirrorOutcome::Completed { value } => value,
                    MirrorOutcome::Failed { message } => return Ok(MirrorOutcome::failed(message)),
                }
            }
        };

        let created = remote
            .create_folder(name, Some(&remote_parent), profile.share_email.as_deref())
            .await;
        let remote_id = match absorb(created, &format!("create folder '{name}'"), ctx.user_id)? {
            Ok(id) => id,
            Err(message) => return Ok(MirrorOutcome::failed(message)),
        };

        let folder = self
            .stores
            .folders
            .create(&CreateFolderRecord {
                owner_id: ctx.user_id,
                name: name.to_string(),
                remote_id: remote_id.clone(),
                parent_id: parent.as_ref().map(|p| p.id),
            })
            .await
            .inspect_err(|e| {
                error!(
                    user_id = %ctx.user_id,
                    remote_id = %remote_id,
                    error = %e.chain(),
                    "Remote folder created but its record could not be saved"
                );
            })?;

        info!(
            user_id = %ctx.user_id,
            folder_id = folder.id,
            parent_id = ?folder.parent_id,
            remote_id = %folder.remote_id,
            name = %folder.name,
            "Folder created"
        );
        Ok(MirrorOutcome::completed(folder))
    }

    /// Delete a folder, remote first. On success the record and every
    /// descendant folder and file record are removed.
    pub async fn delete_folder(
        &self,
        ctx: &RequestContext,
        folder_id: i64,
    ) -> AppResult<MirrorOutcome<FolderRecord>> {
        self.require_approved(ctx).await?;
        let folder = self.owned_folder(ctx, folder_id).await?;
        let remote = self.provider().await?;

        let descendants = match self.folder_tree(ctx).await {
            Ok(tree) => tree.descendants(folder.id).len(),
            Err(e) => {
                warn!(
                    user_id = %ctx.user_id,
                    folder_id = folder.id,
                    error = %e.chain(),
                    "Could not count descendants"
                );
                0
            }
        };

        let deleted = remote.delete(&folder.remote_id).await;
        if let Err(message) =
            absorb(deleted, &format!("delete folder '{}'", folder.name), ctx.user_id)?
        {
            return Ok(MirrorOutcome::failed(message));
        }

        self.stores.folders.delete(ctx.user_id, folder.id).await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = folder.id,
            remote_id = %folder.remote_id,
            descendants,
            "Folder deleted"
        );
        Ok(MirrorOutcome::completed(folder))
    }

    /// Local contents of a folder (None = the user's root).
    ///
    /// Reads only the record stores; remote changes made elsewhere are
    /// not reflected.
    pub async fn list_contents(
        &self,
        ctx: &RequestContext,
        folder_id: Option<i64>,
    ) -> AppResult<FolderListing> {
        self.require_approved(ctx).await?;

        let (folder, breadcrumbs, path) = match folder_id {
            Some(id) => {
                let folder = self.owned_folder(ctx, id).await?;
                let tree = self.folder_tree(ctx).await?;
                let breadcrumbs = tree.breadcrumbs(folder.id)?;
                let path = tree.path(folder.id)?;
                (Some(folder), breadcrumbs, path)
            }
            None => (None, Vec::new(), String::new()),
        };

        let folders = self
            .stores
            .folders
            .list_children(ctx.user_id, folder_id)
            .await?;
        let files = self
            .stores
            .files
            .list_in_folder(ctx.user_id, folder_id)
            .await?;

        Ok(FolderListing {
            folder,
            folders,
            files,
            breadcrumbs,
            path,
        })
    }

    /// The dashboard: a pending notice, or the listing of `folder_id`.
    pub async fn dashboard(
        &self,
        ctx: &RequestContext,
        folder_id: Option<i64>,
    ) -> AppResult<DashboardView> {
        let approved = self
            .stores
            .profiles
            .find_by_user(ctx.user_id)
            .await?
            .is_some_and(|p| p.is_approved);
        if !approved {
            return Ok(DashboardView::Pending {
                message: PENDING_NOTICE.to_string(),
            });
        }
        let listing = self.list_contents(ctx, folder_id).await?;
        Ok(DashboardView::Ready { listing })
    }
}
