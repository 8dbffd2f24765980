//! OAuth access tokens for a service account.
//!
//! A signed RS256 assertion is exchanged at the token endpoint for a
//! bearer token, which is cached until shortly before it expires.

use std::time::{Duration, Instant};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;

use super::credentials::ServiceAccountKey;

/// Full read/write Drive scope.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

// Percent-encoded `urn:ietf:params:oauth:grant-type:jwt-bearer`. The
// assertion itself is base64url and needs no encoding.
const JWT_BEARER_GRANT: &str = "urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Claims of the JWT bearer assertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Issuer: the service account email.
    pub iss: String,
    /// Requested scopes.
    pub scope: String,
    /// Audience: the token endpoint.
    pub aud: String,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expiry (Unix seconds).
    pub exp: i64,
}

impl AssertionClaims {
    /// Claims for `email` requesting `scope` from `token_url`, issued at `now`.
    pub fn new(email: &str, scope: &str, token_url: &str, now: i64) -> Self {
        Self {
            iss: email.to_string(),
            scope: scope.to_string(),
            aud: token_url.to_string(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Issues and caches bearer tokens for one service account.
pub struct TokenSource {
    http: reqwest::Client,
    key_id: String,
    client_email: String,
    token_url: String,
    signing_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSource")
            .field("client_email", &self.client_email)
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}

impl TokenSource {
    /// Build a token source. `token_url` overrides the key's `token_uri`.
    pub fn new(
        http: reqwest::Client,
        key: &ServiceAccountKey,
        token_url: Option<&str>,
    ) -> AppResult<Self> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            AppError::with_source(
                ErrorKind::RemoteUnavailable,
                "Service account private key is not a valid RSA PEM",
                e,
            )
        })?;
        Ok(Self {
            http,
            key_id: key.private_key_id.clone(),
            client_email: key.client_email.clone(),
            token_url: token_url
                .filter(|u| !u.is_empty())
                .unwrap_or(key.token_uri.as_str())
                .to_string(),
            signing_key,
            cached: Mutex::new(None),
        })
    }

    /// A valid bearer token, fetching a new one if the cached one is stale.
    pub async fn access_token(&self) -> AppResult<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref()
            && Instant::now() < token.refresh_at
        {
            return Ok(token.value.clone());
        }

        let fresh = self.fetch().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    fn assertion(&self) -> AppResult<String> {
        let claims = AssertionClaims::new(
            &self.client_email,
            DRIVE_SCOPE,
            &self.token_url,
            chrono::Utc::now().timestamp(),
        );
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.key_id.clone());
        jsonwebtoken::encode(&header, &claims, &self.signing_key).map_err(|e| {
            AppError::with_source(ErrorKind::RemoteUnavailable, "Failed to sign token assertion", e)
        })
    }

    async fn fetch(&self) -> AppResult<CachedToken> {
        let assertion = self.assertion()?;
        debug!(token_url = %self.token_url, "Requesting service account access token");

        let resp = self
            .http
            .post(&self.token_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(format!("grant_type={JWT_BEARER_GRANT}&assertion={assertion}"))
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::RemoteCall, "Token request failed", e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::remote_call(format!(
                "Token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = resp.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::RemoteCall, "Malformed token response", e)
        })?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(REFRESH_MARGIN);
        Ok(CachedToken {
            value: token.access_token,
            refresh_at: Instant::now() + lifetime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_claims_lifetime() {
        let claims = AssertionClaims::new(
            "svc@project.iam.gserviceaccount.com",
            DRIVE_SCOPE,
            "https://oauth2.googleapis.com/token",
            1_700_000_000,
        );
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.aud, "https://oauth2.googleapis.com/token");
        assert_eq!(claims.scope, DRIVE_SCOPE);
    }

    #[test]
    fn test_invalid_pem_is_remote_unavailable() {
        let key = ServiceAccountKey::parse(
            r#"{"type": "service_account", "project_id": "p", "private_key_id": "k",
                "private_key": "not a pem", "client_email": "e"}"#,
        )
        .unwrap();
        let err = TokenSource::new(reqwest::Client::new(), &key, None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::RemoteUnavailable);
    }
}
