//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_entity::folder::{CreateFolderRecord, FolderRecord};

use crate::store::FolderStore;

/// Repository for folder records.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn find_owned(&self, owner_id: Uuid, id: i64) -> AppResult<Option<FolderRecord>> {
        sqlx::query_as::<_, FolderRecord>("SELECT * FROM folders WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<FolderRecord>> {
        sqlx::query_as::<_, FolderRecord>("SELECT * FROM folders WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list folders", e))
    }

    async fn list_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<i64>,
    ) -> AppResult<Vec<FolderRecord>> {
        sqlx::query_as::<_, FolderRecord>(
            "SELECT * FROM folders \
             WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
             ORDER BY name ASC",
        )
        .bind(owner_id)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list child folders", e))
    }

    async fn create(&self, data: &CreateFolderRecord) -> AppResult<FolderRecord> {
        sqlx::query_as::<_, FolderRecord>(
            "INSERT INTO folders (owner_id, name, remote_id, parent_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.owner_id)
        .bind(&data.name)
        .bind(&data.remote_id)
        .bind(data.parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create folder", e))
    }

    async fn delete(&self, owner_id: Uuid, id: i64) -> AppResult<bool> {
        // Child folders and files go with it through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM folders WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete folder", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
