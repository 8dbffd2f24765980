//! Lazily initialized, shared remote storage handle.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{error, info};

use drivehub_core::config::{RemoteConfig, RemoteProviderKind};
use drivehub_core::result::AppResult;
use drivehub_core::traits::remote::RemoteStorage;

use crate::drive::GoogleDriveClient;
use crate::memory::MemoryRemote;

/// Owns the remote provider for the lifetime of the process.
///
/// The provider is built on first use and reused afterwards. If building
/// fails (missing credentials, bad key) the error is returned as
/// `RemoteUnavailable` and the next call tries again.
#[derive(Debug)]
pub struct RemoteClient {
    config: RemoteConfig,
    provider: OnceCell<Arc<dyn RemoteStorage>>,
}

impl RemoteClient {
    /// A handle that builds its provider from `config` on first use.
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            config,
            provider: OnceCell::new(),
        }
    }

    /// A handle around an already constructed provider.
    pub fn from_provider(config: RemoteConfig, provider: Arc<dyn RemoteStorage>) -> Self {
        Self {
            config,
            provider: OnceCell::from(provider),
        }
    }

    /// Remote configuration (root folder naming, provider kind).
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Whether the provider has been built.
    pub fn is_initialized(&self) -> bool {
        self.provider.initialized()
    }

    /// The provider, building it if needed.
    pub async fn get(&self) -> AppResult<Arc<dyn RemoteStorage>> {
        self.provider
            .get_or_try_init(|| build_provider(&self.config))
            .await
            .cloned()
    }
}

async fn build_provider(config: &RemoteConfig) -> AppResult<Arc<dyn RemoteStorage>> {
    let provider: Arc<dyn RemoteStorage> = match config.provider {
        RemoteProviderKind::Memory => Arc::new(MemoryRemote::new()),
        RemoteProviderKind::GoogleDrive => match GoogleDriveClient::from_config(config).await {
            Ok(client) => Arc::new(client),
            Err(e) => {
                error!(
                    credentials = %config.credentials_path,
                    error = %e.chain(),
                    "Remote storage client failed to initialize"
                );
                return Err(e);
            }
        },
    };
    info!(provider = %config.provider, "Remote storage client initialized");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivehub_core::error::ErrorKind;

    #[tokio::test]
    async fn test_memory_provider_is_built_once() {
        let config = RemoteConfig {
            provider: RemoteProviderKind::Memory,
            ..RemoteConfig::default()
        };
        let client = RemoteClient::new(config);
        assert!(!client.is_initialized());

        let first = client.get().await.unwrap();
        let second = client.get().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(client.is_initialized());
    }

    #[tokio::test]
    async fn test_missing_credentials_is_unavailable_and_retried() {
        let config = RemoteConfig {
            provider: RemoteProviderKind::GoogleDrive,
            credentials_path: "/nonexistent/service-account.json".to_string(),
            ..RemoteConfig::default()
        };
        let client = RemoteClient::new(config);

        let err = client.get().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RemoteUnavailable);
        assert!(!client.is_initialized());
        assert!(client.get().await.is_err());
    }

    #[tokio::test]
    async fn test_from_provider_is_ready() {
        let remote = Arc::new(MemoryRemote::new());
        let client = RemoteClient::from_provider(RemoteConfig::default(), remote);
        assert!(client.is_initialized());
        assert_eq!(client.get().await.unwrap().provider_type(), "memory");
    }
}
