//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use drivehub_core::error::AppError;
use drivehub_service::user::{LoginRequest, RegisterRequest};

/// Run the derived validation rules, collecting every message into one
/// `Validation` error.
pub fn validated<T: Validate>(req: T) -> Result<T, AppError> {
    if let Err(errors) = req.validate() {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("Invalid {field}"),
                })
            })
            .collect();
        messages.sort();
        return Err(AppError::validation(messages.join("; ")));
    }
    Ok(req)
}

/// Registration form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterBody {
    /// Desired username.
    #[validate(length(min = 1, max = 150, message = "Username is required"))]
    pub username: String,
    /// Email address.
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Password again.
    #[validate(length(min = 1, message = "Password confirmation is required"))]
    pub password_confirm: String,
}

impl From<RegisterBody> for RegisterRequest {
    fn from(body: RegisterBody) -> Self {
        Self {
            username: body.username,
            email: body.email,
            password: body.password,
            password_confirm: body.password_confirm,
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginBody {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl From<LoginBody> for LoginRequest {
    fn from(body: LoginBody) -> Self {
        Self {
            username: body.username,
            password: body.password,
        }
    }
}

/// Create folder request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Folder name.
    #[validate(length(min = 1, max = 255, message = "Folder name must be 1-255 characters"))]
    pub name: String,
    /// Parent folder (omit for the top level).
    pub parent_id: Option<i64>,
}

/// Settings update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    /// Address new remote objects are shared with; null or blank clears it.
    pub share_email: Option<String>,
}

/// Bulk approve or revoke.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkUsersRequest {
    /// Users to change.
    #[validate(length(min = 1, message = "Select at least one user"))]
    pub user_ids: Vec<Uuid>,
}
