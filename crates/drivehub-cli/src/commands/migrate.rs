//! Database migration command.

use anyhow::Context;

use drivehub_core::config::AppConfig;
use drivehub_database::migration::run_migrations;

use crate::output;

/// Run all pending migrations.
pub async fn execute(config: &AppConfig) -> anyhow::Result<()> {
    let (pool, _) = super::connect(config).await?;

    println!("Running database migrations...");
    run_migrations(pool.pool())
        .await
        .context("Migration failed")?;
    output::print_success("All migrations applied successfully.");

    pool.close().await;
    Ok(())
}
