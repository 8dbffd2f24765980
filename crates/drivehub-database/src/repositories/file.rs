//! File repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_entity::file::{CreateFileRecord, FileRecord};

use crate::store::FileStore;

/// Repository for file records.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileStore for FileRepository {
    async fn find_owned(&self, owner_id: Uuid, id: i64) -> AppResult<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>("SELECT * FROM files WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn list_in_folder(
        &self,
        owner_id: Uuid,
        folder_id: Option<i64>,
    ) -> AppResult<Vec<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(
            "SELECT * FROM files \
             WHERE owner_id = $1 AND folder_id IS NOT DISTINCT FROM $2 \
             ORDER BY uploaded_at DESC, id DESC",
        )
        .bind(owner_id)
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    async fn create(&self, data: &CreateFileRecord) -> AppResult<FileRecord> {
        sqlx::query_as::<_, FileRecord>(
            "INSERT INTO files \
             (owner_id, name, size_bytes, content_type, remote_id, description, folder_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(data.owner_id)
        .bind(&data.name)
        .bind(data.size_bytes)
        .bind(&data.content_type)
        .bind(&data.remote_id)
        .bind(&data.description)
        .bind(data.folder_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create file record", e))
    }

    async fn delete(&self, owner_id: Uuid, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?;
        Ok(result.rows_affected() > 0)
    }
}
