//! CLI command definitions and dispatch.

pub mod diagnose;
pub mod migrate;
pub mod user;

use anyhow::Context;
use clap::{Parser, Subcommand};

use drivehub_core::config::AppConfig;
use drivehub_database::{DatabasePool, Stores};

use crate::output::OutputFormat;

/// DriveHub: per-user file trees mirrored to Google Drive
#[derive(Debug, Parser)]
#[command(name = "drivehub", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.toml` and the environment overlays
    #[arg(long, default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to load
    #[arg(short, long, env = "DRIVEHUB_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Account listing and approval
    User(user::UserArgs),
    /// Check the remote storage credentials and API access
    Diagnose(diagnose::DiagnoseArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> anyhow::Result<()> {
        let config = self.load_config()?;
        match &self.command {
            Commands::Migrate => migrate::execute(&config).await,
            Commands::User(args) => user::execute(args, &config, self.format).await,
            Commands::Diagnose(args) => diagnose::execute(args, &config, self.format).await,
        }
    }

    fn load_config(&self) -> anyhow::Result<AppConfig> {
        AppConfig::load_from(&self.config_dir, &self.env).with_context(|| {
            format!(
                "Failed to load configuration from '{}' (env: {})",
                self.config_dir, self.env
            )
        })
    }
}

/// Helper: connect to the database and build the record stores
pub async fn connect(config: &AppConfig) -> anyhow::Result<(DatabasePool, Stores)> {
    let pool = DatabasePool::connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    let stores = Stores::postgres(pool.pool().clone());
    Ok((pool, stores))
}
