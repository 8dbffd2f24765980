//! Per-user profile and approval state.

pub mod approval;
pub mod model;

pub use approval::ApprovalState;
pub use model::{Profile, UserSummary};
