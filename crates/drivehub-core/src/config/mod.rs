//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate
//! from `config/default.toml`, an environment overlay, and `DRIVEHUB__`
//! environment variables. Each sub-module is one configuration section.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod remote;
pub mod upload;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::remote::{RemoteConfig, RemoteProviderKind};
pub use self::upload::UploadConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Remote storage settings.
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Upload staging and limits.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default`, `config/{env}` and environment variables
    /// prefixed with `DRIVEHUB__` (nested keys separated by `__`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Load configuration from an explicit directory.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DRIVEHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_toml_applies_defaults() {
        let dir = std::env::temp_dir().join(format!(
            "drivehub-config-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).expect("create dir");
        std::fs::write(
            dir.join("default.toml"),
            "[database]\nurl = \"postgres://localhost/drivehub\"\n\n[remote]\nprovider = \"memory\"\n",
        )
        .expect("write default.toml");

        let config = AppConfig::load_from(dir.to_str().expect("utf8 path"), "test")
            .expect("config should load");

        assert_eq!(config.database.url, "postgres://localhost/drivehub");
        assert_eq!(config.remote.provider, RemoteProviderKind::Memory);
        assert_eq!(config.remote.root_folder_prefix, "gdriveftp_");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_database_url_is_rejected() {
        let dir = std::env::temp_dir().join(format!(
            "drivehub-config-empty-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).expect("create dir");

        let err = AppConfig::load_from(dir.to_str().expect("utf8 path"), "nothing")
            .expect_err("database.url is required");
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);

        std::fs::remove_dir_all(&dir).ok();
    }
}
