//! Account services: registration and login, administrator approval,
//! and per-user settings.

pub mod approval;
pub mod registration;
pub mod settings;

pub use approval::{AdminDashboard, ApprovalChange, ApprovalService};
pub use registration::{LoginRequest, LoginResponse, RegisterRequest, Registration, RegistrationService};
pub use settings::{Settings, SettingsService};
