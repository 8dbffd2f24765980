//! Schema migrations for the account, profile, folder and file tables.
//!
//! The SQL lives in the workspace `migrations/` directory and is embedded
//! at compile time.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use drivehub_core::error::{AppError, ErrorKind};

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply every pending migration. Already applied ones are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!(known = MIGRATOR.iter().count(), "Applying database migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!("Schema is up to date");
    Ok(())
}
