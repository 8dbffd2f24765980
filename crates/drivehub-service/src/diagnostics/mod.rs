//! End-to-end check of the remote storage setup.
//!
//! Inspects the credentials file, then exercises the remote service
//! with a throwaway folder: token, create, upload, list, delete.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use drivehub_core::config::{RemoteConfig, RemoteProviderKind};
use drivehub_core::result::AppResult;
use drivehub_core::traits::remote::RemoteStorage;
use drivehub_storage::drive::credentials::{self, CredentialsReport};
use drivehub_storage::{GoogleDriveClient, MemoryRemote};

/// Name of the file uploaded during the check.
pub const TEST_FILE_NAME: &str = "test_file.txt";

/// Overall verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticStatus {
    /// Every check passed.
    Success,
    /// Credentials are fine but a remote step failed.
    Partial,
    /// Credentials are unusable.
    Error,
}

impl DiagnosticStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for DiagnosticStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One check and how it went.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticStep {
    /// Short name of the check.
    pub name: String,
    /// Whether it passed.
    pub ok: bool,
    /// What happened.
    pub detail: String,
}

/// Full diagnostic report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticReport {
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Configured provider.
    pub provider: RemoteProviderKind,
    /// Verdict.
    pub status: DiagnosticStatus,
    /// Credentials inspection, for providers that use a key file.
    pub credentials: Option<CredentialsReport>,
    /// Checks in the order they ran.
    pub steps: Vec<DiagnosticStep>,
}

impl DiagnosticReport {
    fn push(&mut self, name: &str, result: Result<String, String>) -> bool {
        let (ok, detail) = match result {
            Ok(detail) => (true, detail),
            Err(detail) => (false, detail),
        };
        if ok {
            info!(check = %name, detail = %detail, "Diagnostic check passed");
        } else {
            error!(check = %name, detail = %detail, "Diagnostic check failed");
        }
        self.steps.push(DiagnosticStep {
            name: name.to_string(),
            ok,
            detail,
        });
        ok
    }
}

/// Runs the remote storage diagnostics.
#[derive(Debug, Clone)]
pub struct DiagnosticsService {
    config: RemoteConfig,
}

impl DiagnosticsService {
    /// Creates a diagnostics service for `config`.
    pub fn new(config: RemoteConfig) -> Self {
        Self { config }
    }

    /// Run every check. With `offline` only the credentials are looked at.
    pub async fn run(&self, offline: bool, share_email: Option<&str>) -> DiagnosticReport {
        let mut report = DiagnosticReport {
            generated_at: Utc::now(),
            provider: self.config.provider,
            status: DiagnosticStatus::Success,
            credentials: None,
            steps: Vec::new(),
        };

        let remote: Arc<dyn RemoteStorage> = match self.config.provider {
            RemoteProviderKind::Memory => {
                report.push("credentials", Ok("not used by the memory provider".to_string()));
                if offline {
                    return report;
                }
                Arc::new(MemoryRemote::new())
            }
            RemoteProviderKind::GoogleDrive => {
                let inspected = credentials::inspect(Path::new(&self.config.credentials_path));
                let usable = report.push("credentials", describe_credentials(&inspected));
                report.credentials = Some(inspected);
                if !usable {
                    report.status = DiagnosticStatus::Error;
                    return report;
                }
                if offline {
                    return report;
                }

                let client = match GoogleDriveClient::from_config(&self.config).await {
                    Ok(client) => client,
                    Err(e) => {
                        report.push("client", Err(e.chain()));
                        report.status = DiagnosticStatus::Error;
                        return report;
                    }
                };
                if !report.push("token", outcome(client.verify_token().await, |_| {
                    "access token obtained".to_string()
                })) {
                    report.status = DiagnosticStatus::Partial;
                    return report;
                }
                Arc::new(client)
            }
        };

        if !self.exercise(remote.as_ref(), share_email, &mut report).await {
            report.status = DiagnosticStatus::Partial;
        }
        report
    }

    /// Create a folder, upload into it, list it, delete it.
    async fn exercise(
        &self,
        remote: &dyn RemoteStorage,
        share_email: Option<&str>,
        report: &mut DiagnosticReport,
    ) -> bool {
        let folder_name = format!("{}test_folder", self.config.root_folder_prefix);
        let folder_id = match remote.create_folder(&folder_name, None, share_email).await {
            Ok(id) => {
                report.push("create_folder", Ok(format!("created '{folder_name}' ({id})")));
                id
            }
            Err(e) => {
                report.push("create_folder", Err(e.chain()));
                return false;
            }
        };

        let content = format!("DriveHub diagnostic test - {}", Utc::now().to_rfc3339());
        let uploaded = remote
            .upload_file(
                Bytes::from(content),
                TEST_FILE_NAME,
                "text/plain",
                &folder_id,
                share_email,
            )
            .await;
        let file_id = match uploaded {
            Ok(id) => {
                report.push("upload", Ok(format!("uploaded {TEST_FILE_NAME} ({id})")));
                Some(id)
            }
            Err(e) => {
                report.push("upload", Err(e.chain()));
                None
            }
        };

        let list_ok = match &file_id {
            Some(file_id) => {
                let listed = match remote.list_children(&folder_id).await {
                    Ok(children) if children.iter().any(|c| &c.id == file_id) => {
                        Ok(format!("{} object(s), test file present", children.len()))
                    }
                    Ok(children) => Err(format!(
                        "{} object(s), test file missing",
                        children.len()
                    )),
                    Err(e) => Err(e.chain()),
                };
                report.push("list", listed)
            }
            None => false,
        };

        let delete_ok = report.push(
            "delete",
            outcome(remote.delete(&folder_id).await, |_| {
                format!("deleted '{folder_name}'")
            }),
        );

        file_id.is_some() && list_ok && delete_ok
    }
}

fn outcome<T>(result: AppResult<T>, describe: impl FnOnce(&T) -> String) -> Result<String, String> {
    match result {
        Ok(value) => Ok(describe(&value)),
        Err(e) => Err(e.chain()),
    }
}

fn describe_credentials(report: &CredentialsReport) -> Result<String, String> {
    if !report.exists {
        return Err(format!("credentials file not found at {}", report.path));
    }
    if !report.valid_json {
        return Err("credentials file is not valid JSON".to_string());
    }
    if !report.missing_keys.is_empty() {
        return Err(format!(
            "credentials file is missing required keys: {}",
            report.missing_keys.join(", ")
        ));
    }
    Ok(format!(
        "service account {}",
        report.client_email.as_deref().unwrap_or("unknown")
    ))
}
