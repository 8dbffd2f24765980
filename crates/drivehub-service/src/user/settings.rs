//! Per-user settings.

use serde::{Deserialize, Serialize};
use tracing::info;

use drivehub_core::result::AppResult;
use drivehub_core::error::AppError;
use drivehub_database::Stores;
use drivehub_entity::profile::{ApprovalState, Profile};

use super::registration::validate_email;
use crate::context::RequestContext;

/// Settings shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Address new remote objects are shared with.
    pub share_email: Option<String>,
    /// Approval state.
    pub approval: ApprovalState,
    /// Remote root folder ID, if created.
    pub remote_root_id: Option<String>,
}

impl From<Profile> for Settings {
    fn from(p: Profile) -> Self {
        Self {
            approval: p.approval(),
            share_email: p.share_email,
            remote_root_id: p.remote_root_id,
        }
    }
}

/// Reads and edits the caller's profile settings.
#[derive(Debug, Clone)]
pub struct SettingsService {
    stores: Stores,
}

impl SettingsService {
    /// Creates a new settings service.
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    async fn profile(&self, ctx: &RequestContext) -> AppResult<Profile> {
        self.stores
            .profiles
            .find_by_user(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Profile not found"))
    }

    /// Current settings.
    pub async fn get(&self, ctx: &RequestContext) -> AppResult<Settings> {
        self.profile(ctx).await.map(Settings::from)
    }

    /// Set the share email, or clear it with `None` or a blank string.
    pub async fn update_share_email(
        &self,
        ctx: &RequestContext,
        share_email: Option<&str>,
    ) -> AppResult<Settings> {
        self.profile(ctx).await?;
        let email = match share_email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => Some(validate_email(email)?),
            None => None,
        };
        let profile = self
            .stores
            .profiles
            .set_share_email(ctx.user_id, email)
            .await?;
        info!(user_id = %ctx.user_id, share_email = ?profile.share_email, "Settings updated");
        Ok(profile.into())
    }
}
