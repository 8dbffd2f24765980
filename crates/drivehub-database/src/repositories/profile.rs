//! Profile repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_entity::profile::{Profile, UserSummary};

use super::map_insert_error;
use crate::store::ProfileStore;

/// Repository for user profiles.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Create a new profile repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn update_one(
        &self,
        sql: &str,
        user_id: Uuid,
        bind: Option<String>,
        context: &str,
    ) -> AppResult<Profile> {
        sqlx::query_as::<_, Profile>(sql)
            .bind(user_id)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, context, e))?
            .ok_or_else(|| AppError::not_found(format!("Profile for user {user_id} not found")))
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn create(&self, user_id: Uuid) -> AppResult<Profile> {
        sqlx::query_as::<_, Profile>("INSERT INTO profiles (user_id) VALUES ($1) RETURNING *")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_insert_error(e, "Profile already exists", "Failed to create profile")
            })
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find profile", e))
    }

    async fn set_approved(&self, user_id: Uuid, approved: bool) -> AppResult<Profile> {
        sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET is_approved = $2, updated_at = NOW() \
             WHERE user_id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(approved)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update approval", e))?
        .ok_or_else(|| AppError::not_found(format!("Profile for user {user_id} not found")))
    }

    async fn set_remote_root(&self, user_id: Uuid, remote_id: &str) -> AppResult<Profile> {
        self.update_one(
            "UPDATE profiles SET remote_root_id = $2, updated_at = NOW() \
             WHERE user_id = $1 RETURNING *",
            user_id,
            Some(remote_id.to_string()),
            "Failed to record remote root folder",
        )
        .await
    }

    async fn set_share_email(&self, user_id: Uuid, email: Option<&str>) -> AppResult<Profile> {
        self.update_one(
            "UPDATE profiles SET share_email = $2, updated_at = NOW() \
             WHERE user_id = $1 RETURNING *",
            user_id,
            email.map(str::to_string),
            "Failed to update share email",
        )
        .await
    }

    async fn list_summaries(&self) -> AppResult<Vec<UserSummary>> {
        sqlx::query_as::<_, UserSummary>(
            "SELECT u.id AS user_id, u.username, u.email, p.is_approved, \
                    p.remote_root_id, u.created_at \
             FROM users u INNER JOIN profiles p ON p.user_id = u.id \
             ORDER BY u.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))
    }
}
