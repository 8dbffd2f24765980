//! DriveHub Server
//!
//! Wires configuration, the record stores, and the remote storage client
//! together and starts the HTTP API.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use drivehub_api::AppState;
use drivehub_core::config::AppConfig;
use drivehub_core::error::AppError;
use drivehub_database::{DatabasePool, Stores, migration::run_migrations};
use drivehub_storage::RemoteClient;

#[tokio::main]
async fn main() {
    let env = std::env::var("DRIVEHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration (env: {env}): {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e.chain(), "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DriveHub v{}", env!("CARGO_PKG_VERSION"));

    tracing::info!("Connecting to database...");
    let pool = DatabasePool::connect(&config.database).await?;
    run_migrations(pool.pool()).await?;

    let stores = Stores::postgres(pool.pool().clone());

    // Credentials are read on the first remote call, not here.
    let remote = Arc::new(RemoteClient::new(config.remote.clone()));
    tracing::info!(
        provider = %config.remote.provider,
        "Remote storage configured"
    );

    let state = AppState::new(config, stores, remote);
    let result = drivehub_api::serve(state).await;

    pool.close().await;
    tracing::info!("DriveHub stopped");
    result
}
