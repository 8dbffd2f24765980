//! `drivehub`: operator commands for a DriveHub deployment.
//!
//! Runs migrations, approves and revokes accounts, and checks the
//! Google Drive service account. Log output goes to stderr so
//! `--format json` stays machine-readable on stdout.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli.execute().await
}
