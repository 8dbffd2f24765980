//! Registration password rules.

use drivehub_core::config::AuthConfig;
use drivehub_core::error::AppError;

/// Checks a new password and its confirmation.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    min_length: usize,
}

impl PasswordPolicy {
    /// Build from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Validate `password` for `username`.
    pub fn validate(&self, username: &str, password: &str, confirm: &str) -> Result<(), AppError> {
        if password != confirm {
            return Err(AppError::validation("The two password fields didn't match"));
        }
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                self.min_length
            )));
        }
        if password.eq_ignore_ascii_case(username) {
            return Err(AppError::validation(
                "Password is too similar to the username",
            ));
        }
        Ok(())
    }
}
