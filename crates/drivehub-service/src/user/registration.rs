//! Registration and login.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use drivehub_auth::{JwtEncoder, PasswordHasher, PasswordPolicy};
use drivehub_core::config::AuthConfig;
use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_database::Stores;
use drivehub_entity::profile::{ApprovalState, Profile};
use drivehub_entity::user::{CreateUser, User, UserRole};

const MAX_USERNAME_LEN: usize = 150;

/// Message returned after a successful registration.
pub const REGISTERED_NOTICE: &str =
    "Registration successful. Please wait for administrator approval.";

/// Registration form input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Password, repeated.
    pub password_confirm: String,
}

/// A newly registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    /// The user.
    pub user: User,
    /// Its pending profile.
    pub profile: Profile,
    /// Notice for the user.
    pub message: String,
}

/// Login form input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// A successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for later requests.
    pub access_token: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
    /// The user.
    pub user: User,
    /// Approval state, so a pending user can be shown the notice.
    pub approval: ApprovalState,
}

/// Creates accounts and issues access tokens.
#[derive(Debug, Clone)]
pub struct RegistrationService {
    /// Record stores.
    stores: Stores,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Password rules.
    policy: PasswordPolicy,
    /// Token encoder.
    encoder: Arc<JwtEncoder>,
}

/// Check a username: 1 to 150 letters, digits, or `@.+-_`.
pub fn validate_username(username: &str) -> AppResult<&str> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::validation("Username is required"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::validation(format!(
            "Username cannot exceed {MAX_USERNAME_LEN} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        return Err(AppError::validation(
            "Username may only contain letters, digits and @/./+/-/_",
        ));
    }
    Ok(username)
}

/// Check an email address loosely: non-empty with an `@`.
pub fn validate_email(email: &str) -> AppResult<&str> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AppError::validation("Enter a valid email address")),
    }
}

impl RegistrationService {
    /// Creates a new registration service.
    pub fn new(stores: Stores, auth: &AuthConfig) -> Self {
        Self {
            stores,
            hasher: Arc::new(PasswordHasher::new()),
            policy: PasswordPolicy::new(auth),
            encoder: Arc::new(JwtEncoder::new(auth)),
        }
    }

    /// Register a pending account.
    pub async fn register(&self, req: RegisterRequest) -> AppResult<Registration> {
        let username = validate_username(&req.username)?;
        let email = validate_email(&req.email)?;
        self.policy
            .validate(username, &req.password, &req.password_confirm)?;

        let (user, profile) = self
            .create_account(username, email, &req.password, UserRole::User)
            .await?;
        info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(Registration {
            user,
            profile,
            message: REGISTERED_NOTICE.to_string(),
        })
    }

    /// Create an administrator whose profile is already approved.
    pub async fn create_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AppResult<(User, Profile)> {
        let username = validate_username(username)?;
        let email = validate_email(email)?;
        self.policy.validate(username, password, password)?;

        let (user, _) = self
            .create_account(username, email, password, UserRole::Admin)
            .await?;
        let profile = self.stores.profiles.set_approved(user.id, true).await?;
        info!(user_id = %user.id, username = %user.username, "Administrator created");
        Ok((user, profile))
    }

    /// Insert the user, then its profile.
    async fn create_account(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> AppResult<(User, Profile)> {
        if self
            .stores
            .users
            .find_by_username(username)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "Username '{username}' is already taken"
            )));
        }

        let password_hash = self.hasher.hash_password(password)?;
        let user = self
            .stores
            .users
            .create(&CreateUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                role,
            })
            .await?;
        let profile = self.stores.profiles.create(user.id).await?;
        Ok((user, profile))
    }

    /// Check credentials and issue an access token.
    ///
    /// Pending users may log in; the approval gate stops them later.
    pub async fn login(&self, req: LoginRequest) -> AppResult<LoginResponse> {
        let invalid = || AppError::authentication("Invalid username or password");

        let user = self
            .stores
            .users
            .find_by_username(req.username.trim())
            .await?
            .ok_or_else(invalid)?;
        if !self
            .hasher
            .verify_password(&req.password, &user.password_hash)?
        {
            warn!(username = %user.username, "Login failed: wrong password");
            return Err(invalid());
        }

        let approval = self
            .stores
            .profiles
            .find_by_user(user.id)
            .await?
            .map(|p| p.approval())
            .unwrap_or(ApprovalState::Pending);
        let token = self.encoder.issue(user.id, user.role, &user.username)?;

        info!(user_id = %user.id, approval = %approval, "User logged in");
        Ok(LoginResponse {
            access_token: token.access_token,
            expires_at: token.expires_at,
            user,
            approval,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivehub_core::error::ErrorKind;
    use drivehub_database::MemoryStore;

    fn service() -> RegistrationService {
        RegistrationService::new(Stores::memory(MemoryStore::new()), &AuthConfig::default())
    }

    fn request(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "s3cure-pass".to_string(),
            password_confirm: "s3cure-pass".to_string(),
        }
    }

    #[test]
    fn test_username_and_email_rules() {
        assert!(validate_username("alice.b-c_d+e@x").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("with space").is_err());
        assert!(validate_email("a@b").is_ok());
        assert!(validate_email("nobody").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[tokio::test]
    async fn test_register_creates_pending_profile() {
        let svc = service();
        let reg = svc.register(request("alice")).await.unwrap();
        assert_eq!(reg.profile.user_id, reg.user.id);
        assert!(!reg.profile.is_approved);
        assert!(reg.profile.remote_root_id.is_none());
        assert_eq!(reg.message, REGISTERED_NOTICE);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let svc = service();
        svc.register(request("alice")).await.unwrap();
        let mut again = request("alice");
        again.email = "other@example.com".to_string();
        let err = svc.register(again).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_password_mismatch_is_rejected_before_insert() {
        let svc = service();
        let mut req = request("bob");
        req.password_confirm = "different-pass".to_string();
        assert_eq!(svc.register(req).await.unwrap_err().kind, ErrorKind::Validation);
        assert!(svc.stores.users.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pending_user_can_log_in() {
        let svc = service();
        svc.register(request("carol")).await.unwrap();
        let login = svc
            .login(LoginRequest {
                username: "carol".to_string(),
                password: "s3cure-pass".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.approval, ApprovalState::Pending);
        assert!(!login.access_token.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let svc = service();
        svc.register(request("dave")).await.unwrap();
        let wrong = svc
            .login(LoginRequest {
                username: "dave".to_string(),
                password: "nope-nope".to_string(),
            })
            .await
            .unwrap_err();
        let unknown = svc
            .login(LoginRequest {
                username: "erin".to_string(),
                password: "nope-nope".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(wrong.kind, ErrorKind::Authentication);
        assert_eq!(wrong.message, unknown.message);
    }

    #[tokio::test]
    async fn test_create_admin_is_approved() {
        let svc = service();
        let (user, profile) = svc
            .create_admin("root", "root@example.com", "s3cure-pass")
            .await
            .unwrap();
        assert!(user.is_admin());
        assert!(profile.is_approved);
    }
}
