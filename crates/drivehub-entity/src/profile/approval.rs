//! Approval gate states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether an account may use the file operations.
///
/// Revoking an approved account returns it to `Pending`; there is no
/// separate revoked state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalState {
    /// Initial state after registration.
    Pending,
    /// Approved by an administrator.
    Approved,
}

impl ApprovalState {
    /// Map the persisted flag to a state.
    pub fn from_flag(is_approved: bool) -> Self {
        if is_approved {
            Self::Approved
        } else {
            Self::Pending
        }
    }

    /// The persisted flag for this state.
    pub fn as_flag(&self) -> bool {
        matches!(self, Self::Approved)
    }

    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
        }
    }
}

impl fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
