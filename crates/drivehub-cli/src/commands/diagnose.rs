//! Remote storage diagnostics.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use drivehub_core::config::AppConfig;
use drivehub_service::{DiagnosticReport, DiagnosticStatus, DiagnosticsService};

use crate::output::{self, OutputFormat};

/// Arguments for the diagnose command
#[derive(Debug, Args)]
pub struct DiagnoseArgs {
    /// Only inspect the credentials file; make no network calls
    #[arg(long)]
    pub offline: bool,

    /// Share the test folder with this address
    #[arg(long)]
    pub share_email: Option<String>,
}

#[derive(Debug, Serialize, Tabled)]
struct StepRow {
    check: String,
    result: String,
    detail: String,
}

/// Execute the diagnostics and print the report.
///
/// Exits non-zero unless every check passed.
pub async fn execute(
    args: &DiagnoseArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let service = DiagnosticsService::new(config.remote.clone());
    let report = service
        .run(args.offline, args.share_email.as_deref())
        .await;

    match format {
        OutputFormat::Json => output::print_item(&report, format),
        OutputFormat::Table => print_table(&report),
    }

    if report.status != DiagnosticStatus::Success {
        anyhow::bail!("Diagnostics finished with status '{}'", report.status);
    }
    Ok(())
}

fn print_table(report: &DiagnosticReport) {
    output::print_kv("Provider", &report.provider.to_string());
    if let Some(credentials) = &report.credentials {
        output::print_kv("Credentials", &credentials.path);
        if let Some(email) = &credentials.client_email {
            output::print_kv("Service account", email);
        }
        if let Some(project) = &credentials.project_id {
            output::print_kv("Project", project);
        }
        if !credentials.missing_keys.is_empty() {
            output::print_kv("Missing keys", &credentials.missing_keys.join(", "));
        }
    }
    println!();

    let rows: Vec<StepRow> = report
        .steps
        .iter()
        .map(|s| StepRow {
            check: s.name.clone(),
            result: if s.ok { "ok" } else { "FAILED" }.to_string(),
            detail: s.detail.clone(),
        })
        .collect();
    output::print_list(&rows, OutputFormat::Table);

    println!();
    match report.status {
        DiagnosticStatus::Success => output::print_success("Remote storage is fully usable"),
        DiagnosticStatus::Partial => {
            output::print_warning("Credentials are valid but an API step failed")
        }
        DiagnosticStatus::Error => output::print_error("Credentials are unusable"),
    }
}
