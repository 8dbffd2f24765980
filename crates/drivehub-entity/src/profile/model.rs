//! Profile entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::approval::ApprovalState;

/// One-to-one companion of a [`User`](crate::user::User).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    /// Owning user (also the primary key).
    pub user_id: Uuid,
    /// Approval flag, false until an administrator approves.
    pub is_approved: bool,
    /// Remote ID of the user's root folder, set on first need.
    pub remote_root_id: Option<String>,
    /// Address new remote objects are shared with.
    pub share_email: Option<String>,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// A fresh pending profile for `user_id`.
    pub fn pending(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            is_approved: false,
            remote_root_id: None,
            share_email: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Current approval state.
    pub fn approval(&self) -> ApprovalState {
        ApprovalState::from_flag(self.is_approved)
    }
}

/// A user joined with their profile, for administration screens.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    /// User ID.
    pub user_id: Uuid,
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Approval flag.
    pub is_approved: bool,
    /// Remote root folder ID, if created.
    pub remote_root_id: Option<String>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}
