//! Service account key file handling.

use std::path::Path;

use serde::{Deserialize, Serialize};

use drivehub_core::AppError;
use drivehub_core::result::AppResult;

/// Keys a usable service account file must carry.
pub const REQUIRED_KEYS: [&str; 5] = [
    "type",
    "project_id",
    "private_key_id",
    "private_key",
    "client_email",
];

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The parts of a service account JSON key the client needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Always `service_account` for a valid key.
    #[serde(rename = "type")]
    pub key_type: String,
    /// Cloud project the account belongs to.
    pub project_id: String,
    /// Key ID, sent as the JWT `kid`.
    pub private_key_id: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// Account email, the JWT issuer.
    pub client_email: String,
    /// OAuth token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("client_email", &self.client_email)
            .finish_non_exhaustive()
    }
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Read and parse a key file. Any failure means the remote is unavailable.
    pub async fn load(path: &Path) -> AppResult<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::with_source(
                drivehub_core::error::ErrorKind::RemoteUnavailable,
                format!("Credentials file not found at {}", path.display()),
                e,
            )
        })?;
        Self::parse(&raw)
    }

    /// Parse key file contents.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let key: Self = serde_json::from_str(raw).map_err(|e| {
            AppError::with_source(
                drivehub_core::error::ErrorKind::RemoteUnavailable,
                "Credentials file is not a valid service account key",
                e,
            )
        })?;
        if key.key_type != "service_account" {
            return Err(AppError::remote_unavailable(format!(
                "Credentials type is '{}', expected 'service_account'",
                key.key_type
            )));
        }
        Ok(key)
    }
}

/// Result of inspecting a credentials file without using it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsReport {
    /// Path that was inspected.
    pub path: String,
    /// Whether the file exists.
    pub exists: bool,
    /// Whether the file parsed as a JSON object.
    pub valid_json: bool,
    /// Required keys that are absent.
    pub missing_keys: Vec<String>,
    /// The account email, when present.
    pub client_email: Option<String>,
    /// The project, when present.
    pub project_id: Option<String>,
}

impl CredentialsReport {
    /// Whether the file looks usable.
    pub fn is_usable(&self) -> bool {
        self.exists && self.valid_json && self.missing_keys.is_empty()
    }
}

/// Inspect a credentials file and report what is wrong with it.
pub fn inspect(path: &Path) -> CredentialsReport {
    let mut report = CredentialsReport {
        path: path.display().to_string(),
        exists: path.is_file(),
        valid_json: false,
        missing_keys: REQUIRED_KEYS.iter().map(|k| k.to_string()).collect(),
        client_email: None,
        project_id: None,
    };
    if !report.exists {
        return report;
    }

    let Ok(raw) = std::fs::read_to_string(path) else {
        return report;
    };
    let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(&raw)
    else {
        return report;
    };

    report.valid_json = true;
    report.missing_keys = REQUIRED_KEYS
        .iter()
        .filter(|k| !map.contains_key(**k))
        .map(|k| k.to_string())
        .collect();
    report.client_email = map
        .get("client_email")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    report.project_id = map
        .get("project_id")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_inspect_missing_file() {
        let report = inspect(Path::new("/definitely/not/here.json"));
        assert!(!report.exists);
        assert!(!report.is_usable());
        assert_eq!(report.missing_keys.len(), REQUIRED_KEYS.len());
    }

    #[test]
    fn test_inspect_reports_missing_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"type": "service_account", "project_id": "p", "client_email": "svc@p.iam"}}"#
        )
        .unwrap();

        let report = inspect(file.path());
        assert!(report.exists);
        assert!(report.valid_json);
        assert_eq!(report.missing_keys, vec!["private_key_id", "private_key"]);
        assert_eq!(report.client_email.as_deref(), Some("svc@p.iam"));
        assert!(!report.is_usable());
    }

    #[test]
    fn test_inspect_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let report = inspect(file.path());
        assert!(report.exists);
        assert!(!report.valid_json);
    }

    #[test]
    fn test_parse_rejects_wrong_type() {
        let raw = r#"{"type": "authorized_user", "project_id": "p", "private_key_id": "k",
                      "private_key": "pem", "client_email": "e"}"#;
        let err = ServiceAccountKey::parse(raw).unwrap_err();
        assert_eq!(err.kind, drivehub_core::error::ErrorKind::RemoteUnavailable);
    }

    #[test]
    fn test_parse_defaults_token_uri() {
        let raw = r#"{"type": "service_account", "project_id": "p", "private_key_id": "k",
                      "private_key": "pem", "client_email": "e"}"#;
        let key = ServiceAccountKey::parse(raw).unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_remote_unavailable() {
        let err = ServiceAccountKey::load(Path::new("/nope/key.json"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, drivehub_core::error::ErrorKind::RemoteUnavailable);
    }
}
