//! Remote storage configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which remote storage backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteProviderKind {
    /// Google Drive v3 using a service account.
    GoogleDrive,
    /// Process-local store, for development and tests.
    Memory,
}

impl fmt::Display for RemoteProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GoogleDrive => f.write_str("google_drive"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

/// Remote storage connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Backend selection.
    #[serde(default = "default_provider")]
    pub provider: RemoteProviderKind,
    /// Path to the service account JSON key file.
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,
    /// Base URL of the Drive files API.
    #[serde(default = "default_api_base")]
    pub api_base_url: String,
    /// Base URL of the Drive media upload API.
    #[serde(default = "default_upload_base")]
    pub upload_base_url: String,
    /// OAuth token endpoint. Overrides the `token_uri` of the key file when set.
    #[serde(default)]
    pub token_url: String,
    /// Prefix of every user's root folder name.
    #[serde(default = "default_root_prefix")]
    pub root_folder_prefix: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            credentials_path: default_credentials_path(),
            api_base_url: default_api_base(),
            upload_base_url: default_upload_base(),
            token_url: String::new(),
            root_folder_prefix: default_root_prefix(),
            request_timeout_seconds: default_timeout(),
        }
    }
}

impl RemoteConfig {
    /// Name of the root folder created for `username`.
    pub fn root_folder_name(&self, username: &str) -> String {
        format!("{}{}", self.root_folder_prefix, username)
    }
}

fn default_provider() -> RemoteProviderKind {
    RemoteProviderKind::GoogleDrive
}

fn default_credentials_path() -> String {
    "config/service-account.json".to_string()
}

fn default_api_base() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_upload_base() -> String {
    "https://www.googleapis.com/upload/drive/v3".to_string()
}

fn default_root_prefix() -> String {
    "gdriveftp_".to_string()
}

fn default_timeout() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_folder_name_is_prefixed() {
        let config = RemoteConfig::default();
        assert_eq!(config.root_folder_name("alice"), "gdriveftp_alice");
    }
}
