//! User management CLI commands.

use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use drivehub_core::config::AppConfig;
use drivehub_database::Stores;
use drivehub_entity::user::UserRole;
use drivehub_service::{ApprovalService, MirrorService, RegistrationService, RequestContext};
use drivehub_storage::RemoteClient;

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List accounts with their approval state
    List {
        /// Only accounts awaiting approval
        #[arg(long, conflicts_with = "approved")]
        pending: bool,
        /// Only approved accounts
        #[arg(long)]
        approved: bool,
    },
    /// Approve an account (creates its remote root folder on first approval)
    Approve {
        /// Username
        username: String,
    },
    /// Return an account to pending
    Revoke {
        /// Username
        username: String,
    },
    /// Create an approved administrator account
    CreateAdmin {
        /// Username
        #[arg(short, long)]
        username: String,
        /// Email address
        #[arg(short, long)]
        email: String,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    /// Username
    username: String,
    /// Email
    email: String,
    /// Approval state
    approval: String,
    /// Remote root folder
    remote_root: String,
    /// Joined
    joined: String,
}

/// The CLI acts with administrator rights.
fn operator() -> RequestContext {
    RequestContext::new(Uuid::nil(), UserRole::Admin, "drivehub-cli")
}

fn approvals(config: &AppConfig, stores: &Stores) -> ApprovalService {
    let remote = Arc::new(RemoteClient::new(config.remote.clone()));
    let mirror = Arc::new(MirrorService::new(
        stores.clone(),
        remote,
        config.upload.clone(),
    ));
    ApprovalService::new(stores.clone(), mirror)
}

async fn user_id(stores: &Stores, username: &str) -> anyhow::Result<Uuid> {
    stores
        .users
        .find_by_username(username)
        .await?
        .map(|u| u.id)
        .with_context(|| format!("User '{username}' not found"))
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let (pool, stores) = super::connect(config).await?;

    match &args.command {
        UserCommand::List { pending, approved } => {
            let dashboard = approvals(config, &stores)
                .admin_dashboard(&operator())
                .await?;
            let mut summaries = Vec::new();
            if !approved {
                summaries.extend(dashboard.pending);
            }
            if !pending {
                summaries.extend(dashboard.approved);
            }

            let rows: Vec<UserRow> = summaries
                .into_iter()
                .map(|s| UserRow {
                    username: s.username,
                    email: s.email,
                    approval: if s.is_approved { "approved" } else { "pending" }.to_string(),
                    remote_root: s.remote_root_id.unwrap_or_else(|| "-".to_string()),
                    joined: s.created_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();

            output::print_list(&rows, format);
        }
        UserCommand::Approve { username } => {
            let id = user_id(&stores, username).await?;
            let change = approvals(config, &stores).approve(&operator(), id).await?;
            if !change.changed {
                output::print_warning(&format!("User '{username}' was already approved"));
            } else {
                output::print_success(&format!("User '{username}' approved"));
            }
            match &change.remote_root_id {
                Some(root) => output::print_kv("Remote root", root),
                None => output::print_warning(
                    "Remote root folder not created yet; it will be created on first use",
                ),
            }
        }
        UserCommand::Revoke { username } => {
            let id = user_id(&stores, username).await?;
            let change = approvals(config, &stores).revoke(&operator(), id).await?;
            if change.changed {
                output::print_success(&format!("User '{username}' returned to pending"));
            } else {
                output::print_warning(&format!("User '{username}' was not approved"));
            }
        }
        UserCommand::CreateAdmin { username, email } => {
            let password = dialoguer::Password::new()
                .with_prompt("Password")
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()
                .context("Failed to read password")?;

            let registration = RegistrationService::new(stores.clone(), &config.auth);
            let (user, _) = registration
                .create_admin(username, email, &password)
                .await?;
            output::print_success(&format!("Administrator '{}' created", user.username));
            output::print_kv("ID", &user.id.to_string());
        }
    }

    pool.close().await;
    Ok(())
}
