//! Administrator approval of accounts.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_database::Stores;
use drivehub_entity::profile::{ApprovalState, Profile, UserSummary};

use crate::context::RequestContext;
use crate::mirror::{MirrorOutcome, MirrorService};

/// Result of one approve or revoke.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalChange {
    /// The account.
    pub user_id: Uuid,
    /// State after the call.
    pub state: ApprovalState,
    /// Whether the state actually changed.
    pub changed: bool,
    /// Root folder ID after the call, if any.
    pub remote_root_id: Option<String>,
}

/// Accounts split by approval state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminDashboard {
    /// Awaiting approval, newest first.
    pub pending: Vec<UserSummary>,
    /// Approved, newest first.
    pub approved: Vec<UserSummary>,
}

/// Moves accounts between pending and approved.
#[derive(Debug, Clone)]
pub struct ApprovalService {
    /// Record stores.
    stores: Stores,
    /// Mirror, for the eager root folder on first approval.
    mirror: Arc<MirrorService>,
}

impl ApprovalService {
    /// Creates a new approval service.
    pub fn new(stores: Stores, mirror: Arc<MirrorService>) -> Self {
        Self { stores, mirror }
    }

    fn require_admin(ctx: &RequestContext) -> AppResult<()> {
        if ctx.is_admin() {
            Ok(())
        } else {
            Err(AppError::authorization("Administrator access required"))
        }
    }

    async fn profile_of(&self, user_id: Uuid) -> AppResult<Profile> {
        if let Some(profile) = self.stores.profiles.find_by_user(user_id).await? {
            return Ok(profile);
        }
        self.stores
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        warn!(user_id = %user_id, "User has no profile; creating one");
        self.stores.profiles.create(user_id).await
    }

    /// Pending and approved accounts.
    pub async fn admin_dashboard(&self, ctx: &RequestContext) -> AppResult<AdminDashboard> {
        Self::require_admin(ctx)?;
        let (approved, pending): (Vec<UserSummary>, Vec<UserSummary>) = self
            .stores
            .profiles
            .list_summaries()
            .await?
            .into_iter()
            .partition(|s| s.is_approved);
        Ok(AdminDashboard { pending, approved })
    }

    /// Approve an account.
    ///
    /// The first approval also creates the user's root folder; if that
    /// fails the approval still stands.
    pub async fn approve(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<ApprovalChange> {
        Self::require_admin(ctx)?;
        self.approve_one(ctx, user_id).await
    }

    async fn approve_one(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<ApprovalChange> {
        let before = self.profile_of(user_id).await?;
        let mut profile = if before.is_approved {
            before.clone()
        } else {
            self.stores.profiles.set_approved(user_id, true).await?
        };
        let changed = !before.is_approved;

        if changed && profile.remote_root_id.is_none() {
            let user = self
                .stores
                .users
                .find_by_id(user_id)
                .await?
                .ok_or_else(|| AppError::not_found("User not found"))?;
            match self.mirror.ensure_root_for(user_id, &user.username).await {
                Ok(MirrorOutcome::Completed { value }) => profile.remote_root_id = Some(value),
                Ok(MirrorOutcome::Failed { message }) => {
                    warn!(user_id = %user_id, reason = %message, "Root folder not created on approval");
                }
                Err(e) => {
                    error!(user_id = %user_id, error = %e.chain(), "Root folder not created on approval");
                }
            }
        }

        if changed {
            info!(admin_id = %ctx.user_id, user_id = %user_id, "User approved");
        }
        Ok(ApprovalChange {
            user_id,
            state: ApprovalState::Approved,
            changed,
            remote_root_id: profile.remote_root_id,
        })
    }

    /// Return an account to pending.
    pub async fn revoke(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<ApprovalChange> {
        Self::require_admin(ctx)?;
        self.revoke_one(ctx, user_id).await
    }

    async fn revoke_one(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<ApprovalChange> {
        let before = self.profile_of(user_id).await?;
        let profile = if before.is_approved {
            self.stores.profiles.set_approved(user_id, false).await?
        } else {
            before.clone()
        };
        let changed = before.is_approved;
        if changed {
            info!(admin_id = %ctx.user_id, user_id = %user_id, "User approval revoked");
        }
        Ok(ApprovalChange {
            user_id,
            state: ApprovalState::Pending,
            changed,
            remote_root_id: profile.remote_root_id,
        })
    }

    /// Resolve every account in a bulk request before any of them is
    /// changed, so an unknown ID rejects the whole batch.
    async fn resolve_all(&self, user_ids: &[Uuid]) -> AppResult<()> {
        for id in user_ids {
            self.profile_of(*id)
                .await
                .map_err(|e| match e.kind {
                    ErrorKind::NotFound => AppError::not_found(format!("User {id} not found")),
                    _ => e,
                })?;
        }
        Ok(())
    }

    /// Approve several accounts; returns how many changed.
    ///
    /// Nothing changes unless every ID exists.
    pub async fn approve_many(&self, ctx: &RequestContext, user_ids: &[Uuid]) -> AppResult<usize> {
        Self::require_admin(ctx)?;
        self.resolve_all(user_ids).await?;
        let mut count = 0;
        for id in user_ids {
            if self.approve_one(ctx, *id).await?.changed {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Revoke several accounts; returns how many changed.
    ///
    /// Nothing changes unless every ID exists.
    pub async fn revoke_many(&self, ctx: &RequestContext, user_ids: &[Uuid]) -> AppResult<usize> {
        Self::require_admin(ctx)?;
        self.resolve_all(user_ids).await?;
        let mut count = 0;
        for id in user_ids {
            if self.revoke_one(ctx, *id).await?.changed {
                count += 1;
            }
        }
        Ok(count)
    }
}
