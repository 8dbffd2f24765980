//! File operations: upload, download, delete.

use tracing::{error, info, warn};

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_entity::file::{CreateFileRecord, FileRecord};

use super::{
    BatchReport, DownloadResult, MirrorOutcome, MirrorService, UploadRequest, UploadSummary,
    absorb,
};
use crate::context::RequestContext;
use crate::upload::{StagedFile, resolve_content_type};

impl MirrorService {
    /// Find a file owned by the caller. Missing and foreign files
    /// produce the same error.
    async fn owned_file(&self, ctx: &RequestContext, file_id: i64) -> AppResult<FileRecord> {
        self.stores
            .files
            .find_owned(ctx.user_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))
    }

    /// Handle the combined upload form.
    ///
    /// With a folder name the folder is created first (under
    /// `parent_id`) and the files go into it; without one the files go
    /// into `parent_id` directly.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        request: UploadRequest,
    ) -> AppResult<UploadSummary> {
        self.require_approved(ctx).await?;
        request
            .check_limits(&self.upload)
            .map_err(AppError::validation)?;

        let UploadRequest {
            files,
            description,
            folder_name,
            parent_id,
        } = request;
        let mut summary = UploadSummary::default();

        let mut destination = parent_id;
        if let Some(name) = folder_name.as_deref().filter(|n| !n.trim().is_empty()) {
            match self.create_folder(ctx, name, parent_id).await? {
                MirrorOutcome::Completed { value } => {
                    summary
                        .messages
                        .push(format!("Folder '{}' created.", value.name));
                    destination = Some(value.id);
                    summary.folder = Some(value);
                }
                MirrorOutcome::Failed { message } => {
                    summary.messages.push(message);
                    return Ok(summary);
                }
            }
        }

        if files.is_empty() {
            return Ok(summary);
        }

        match self
            .upload_files(ctx, files, destination, description.as_deref())
            .await?
        {
            MirrorOutcome::Completed { value } => {
                summary.messages.push(value.summary());
                summary.report = Some(value);
            }
            MirrorOutcome::Failed { message } => summary.messages.push(message),
        }
        Ok(summary)
    }

    /// Upload staged files into `folder_id` (None = the user's root).
    ///
    /// Files are sent one at a time. Each one that uploads gets a
    /// record; a failure is counted and the batch carries on. The
    /// staged files are removed when this returns.
    pub async fn upload_files(
        &self,
        ctx: &RequestContext,
        files: Vec<StagedFile>,
        folder_id: Option<i64>,
        description: Option<&str>,
    ) -> AppResult<MirrorOutcome<BatchReport>> {
        let profile = self.require_approved(ctx).await?;
        if files.len() > self.upload.max_files_per_batch {
            return Err(AppError::validation(format!(
                "At most {} files can be uploaded at once",
                self.upload.max_files_per_batch
            )));
        }
        let folder = match folder_id {
            Some(id) => Some(self.owned_folder(ctx, id).await?),
            None => None,
        };

        let remote = self.provider().await?;
        let destination = match &folder {
            Some(folder) => folder.remote_id.clone(),
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

        let description = description.map(str::trim).filter(|d| !d.is_empty());
        let mut report = BatchReport::default();

        for staged in files {
            let name = staged.name().to_string();
            if staged.is_oversized() {
                warn!(user_id = %ctx.user_id, name = %name, size = staged.size(), "Upload too large");
                report.record_failure(
                    &name,
                    format!("File exceeds the {} byte limit", staged.max_size()),
                );
                continue;
            }

            let data = match staged.read().await {
                Ok(data) => data,
                Err(e) => {
                    error!(user_id = %ctx.user_id, name = %name, error = %e.chain(), "Staged upload unreadable");
                    report.record_failure(&name, "The upload could not be read");
                    continue;
                }
            };
            let size = data.len() as i64;
            let content_type = resolve_content_type(staged.content_type(), &name);

            let uploaded = remote
                .upload_file(
                    data,
                    &name,
                    &content_type,
                    &destination,
                    profile.share_email.as_deref(),
                )
                .await;
            let remote_id = match absorb(uploaded, &format!("upload '{name}'"), ctx.user_id) {
                Ok(Ok(id)) => id,
                Ok(Err(message)) => {
                    report.record_failure(&name, message);
                    continue;
                }
                Err(e) => {
                    error!(user_id = %ctx.user_id, name = %name, error = %e.chain(), "Upload failed");
                    report.record_failure(&name, e.message);
                    continue;
                }
            };

            let created = self
                .stores
                .files
                .create(&CreateFileRecord {
                    owner_id: ctx.user_id,
                    name: name.clone(),
                    size_bytes: size,
                    content_type: Some(content_type),
                    remote_id: remote_id.clone(),
                    description: description.map(str::to_string),
                    folder_id: folder.as_ref().map(|f| f.id),
                })
                .await;
            match created {
                Ok(file) => {
                    info!(
                        user_id = %ctx.user_id,
                        file_id = file.id,
                        folder_id = ?file.folder_id,
                        remote_id = %file.remote_id,
                        size = file.size_bytes,
                        "File uploaded"
                    );
                    report.record_success(file);
                }
                Err(e) => {
                    error!(
                        user_id = %ctx.user_id,
                        remote_id = %remote_id,
                        error = %e.chain(),
                        "Remote file uploaded but its record could not be saved"
                    );
                    report.record_failure(&name, "The upload could not be recorded");
                }
            }
        }

        info!(
            user_id = %ctx.user_id,
            succeeded = report.succeeded,
            failed = report.failed,
            "Upload batch finished"
        );
        Ok(MirrorOutcome::completed(report))
    }

    /// Fetch a file's bytes from remote storage.
    ///
    /// Ownership is checked before the remote client is touched.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        file_id: i64,
    ) -> AppResult<MirrorOutcome<DownloadResult>> {
        self.require_approved(ctx).await?;
        let file = self.owned_file(ctx, file_id).await?;
        let remote = self.provider().await?;

        let fetched = remote.download_file(&file.remote_id).await;
        let data = match absorb(fetched, &format!("download '{}'", file.name), ctx.user_id)? {
            Ok(data) => data,
            Err(message) => return Ok(MirrorOutcome::failed(message)),
        };

        info!(user_id = %ctx.user_id, file_id = file.id, bytes = data.len(), "File downloaded");
        let content_type = file.effective_content_type().to_string();
        Ok(MirrorOutcome::completed(DownloadResult {
            file,
            data,
            content_type,
        }))
    }

    /// Delete a file, remote first. The record is only removed once the
    /// remote object is gone.
    pub async fn delete_file(
        &self,
        ctx: &RequestContext,
        file_id: i64,
    ) -> AppResult<MirrorOutcome<FileRecord>> {
        self.require_approved(ctx).await?;
        let file = self.owned_file(ctx, file_id).await?;
        let remote = self.provider().await?;

        let deleted = remote.delete(&file.remote_id).await;
        if let Err(message) = absorb(deleted, &format!("delete '{}'", file.name), ctx.user_id)? {
            return Ok(MirrorOutcome::failed(message));
        }

        self.stores.files.delete(ctx.user_id, file.id).await?;
        info!(
            user_id = %ctx.user_id,
            file_id = file.id,
            remote_id = %file.remote_id,
            "File deleted"
        );
        Ok(MirrorOutcome::completed(file))
    }
}
