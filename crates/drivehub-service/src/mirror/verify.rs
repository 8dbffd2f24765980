//! Comparison of local records against a remote folder listing.

use std::collections::HashSet;

use tracing::{info, warn};

use drivehub_core::result::AppResult;

use super::{MirrorOutcome, MirrorService, VerifyReport, absorb};
use crate::context::RequestContext;

impl MirrorService {
    /// Report records whose remote object is missing and remote objects
    /// nothing records, for one folder (None = the user's root).
    ///
    /// Nothing is repaired.
    pub async fn verify_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Option<i64>,
    ) -> AppResult<MirrorOutcome<VerifyReport>> {
        let profile = self.require_approved(ctx).await?;
        let remote_id = match folder_id {
            Some(id) => Some(self.owned_folder(ctx, id).await?.remote_id),
            None => profile.remote_root_id.clone(),
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

        // Without a root folder nothing can have been uploaded to it.
        let Some(remote_id) = remote_id else {
            return Ok(MirrorOutcome::completed(VerifyReport {
                remote_id: None,
                stale_folders: folders,
                stale_files: files,
                untracked: Vec::new(),
            }));
        };

        let remote = self.provider().await?;
        let listed = remote.list_children(&remote_id).await;
        let children = match absorb(listed, "list the remote folder", ctx.user_id)? {
            Ok(children) => children,
            Err(message) => return Ok(MirrorOutcome::failed(message)),
        };

        let remote_ids: HashSet<&str> = children.iter().map(|o| o.id.as_str()).collect();
        let local_ids: HashSet<&str> = folders
            .iter()
            .map(|f| f.remote_id.as_str())
            .chain(files.iter().map(|f| f.remote_id.as_str()))
            .collect();

        let untracked = children
            .iter()
            .filter(|o| !local_ids.contains(o.id.as_str()))
            .cloned()
            .collect();
        let stale_folders = folders
            .iter()
            .filter(|f| !remote_ids.contains(f.remote_id.as_str()))
            .cloned()
            .collect();
        let stale_files = files
            .iter()
            .filter(|f| !remote_ids.contains(f.remote_id.as_str()))
            .cloned()
            .collect();

        let report = VerifyReport {
            remote_id: Some(remote_id),
            stale_folders,
            stale_files,
            untracked,
        };
        if report.is_consistent() {
            info!(user_id = %ctx.user_id, folder_id = ?folder_id, "Folder in sync with remote");
        } else {
            warn!(
                user_id = %ctx.user_id,
                folder_id = ?folder_id,
                stale_folders = report.stale_folders.len(),
                stale_files = report.stale_files.len(),
                untracked = report.untracked.len(),
                "Folder differs from remote"
            );
        }
        Ok(MirrorOutcome::completed(report))
    }
}
