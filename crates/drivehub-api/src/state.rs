//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use drivehub_auth::JwtDecoder;
use drivehub_core::config::AppConfig;
use drivehub_database::Stores;
use drivehub_service::{
    ApprovalService, MirrorService, RegistrationService, SettingsService, UploadStager,
};
use drivehub_storage::RemoteClient;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Lazily built remote storage handle
    pub remote: Arc<RemoteClient>,
    /// Staging area for multipart uploads
    pub stager: Arc<UploadStager>,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT access token decoder
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// Folder/file mirror
    pub mirror: Arc<MirrorService>,
    /// Administrator approval
    pub approvals: Arc<ApprovalService>,
    /// Registration and login
    pub registration: Arc<RegistrationService>,
    /// Per-user settings
    pub settings: Arc<SettingsService>,

    /// Process start, for the health endpoint
    pub started_at: Instant,
}

impl AppState {
    /// Wire every service from configuration, the record stores, and the
    /// remote handle.
    pub fn new(config: AppConfig, stores: Stores, remote: Arc<RemoteClient>) -> Self {
        let mirror = Arc::new(MirrorService::new(
            stores.clone(),
            Arc::clone(&remote),
            config.upload.clone(),
        ));
        let approvals = Arc::new(ApprovalService::new(stores.clone(), Arc::clone(&mirror)));
        let registration = Arc::new(RegistrationService::new(stores.clone(), &config.auth));
        let settings = Arc::new(SettingsService::new(stores));

        Self {
            stager: Arc::new(UploadStager::new(&config.upload)),
            jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
            config: Arc::new(config),
            remote,
            mirror,
            approvals,
            registration,
            settings,
            started_at: Instant::now(),
        }
    }
}
