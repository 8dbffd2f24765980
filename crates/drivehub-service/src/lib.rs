//! # drivehub-service
//!
//! Business logic for DriveHub. The [`MirrorService`] keeps each user's
//! folder/file tree in step between the record stores and remote
//! storage; the user services cover registration, approval, and
//! settings; [`DiagnosticsService`] checks the remote setup end to end.
//!
//! Services follow constructor injection: every dependency is handed in
//! at construction time as an `Arc` or a [`Stores`] bundle.
//!
//! [`Stores`]: drivehub_database::Stores

pub mod context;
pub mod diagnostics;
pub mod mirror;
pub mod upload;
pub mod user;

pub use context::RequestContext;
pub use diagnostics::{DiagnosticReport, DiagnosticStatus, DiagnosticsService};
pub use mirror::{
    BatchReport, DashboardView, DownloadResult, FolderListing, MirrorOutcome, MirrorService,
    UploadRequest, UploadSummary, VerifyReport,
};
pub use upload::{StagedFile, UploadStager};
pub use user::{ApprovalService, RegistrationService, SettingsService};
