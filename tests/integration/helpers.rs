//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use drivehub_api::{AppState, build_router};
use drivehub_core::config::{
    AppConfig, AuthConfig, DatabaseConfig, LoggingConfig, RemoteConfig, RemoteProviderKind,
    ServerConfig, UploadConfig,
};
use drivehub_database::{MemoryStore, Stores};
use drivehub_entity::user::UserRole;
use drivehub_service::RequestContext;
use drivehub_storage::{MemoryRemote, RemoteClient};

pub const PASSWORD: &str = "correct-horse-battery";
pub const BOUNDARY: &str = "drivehub-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for calling services directly
    pub state: AppState,
    /// Record store behind the router
    pub store: MemoryStore,
    /// Remote storage behind the router
    pub remote: MemoryRemote,
    _staging: TempDir,
}

/// A response with its body parsed as JSON where possible.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Bytes,
    pub body: Value,
}

/// One part of a multipart form.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

impl TestApp {
    /// A router over the in-memory store and remote.
    pub fn new() -> Self {
        let staging = tempfile::tempdir().expect("staging dir");
        let config = AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "postgres://unused".to_string(),
                max_connections: 1,
                min_connections: 1,
                connect_timeout_seconds: 1,
                idle_timeout_seconds: 1,
            },
            auth: AuthConfig {
                jwt_secret: "integration-test-secret".to_string(),
                ..AuthConfig::default()
            },
            remote: RemoteConfig {
                provider: RemoteProviderKind::Memory,
                ..RemoteConfig::default()
            },
            upload: UploadConfig {
                max_file_size_bytes: 64,
                max_files_per_batch: 3,
                staging_dir: staging.path().display().to_string(),
            },
            logging: LoggingConfig::default(),
        };

        let store = MemoryStore::new();
        let remote = MemoryRemote::new();
        let client = RemoteClient::from_provider(config.remote.clone(), Arc::new(remote.clone()));
        let state = AppState::new(config, Stores::memory(store.clone()), Arc::new(client));

        Self {
            router: build_router(state.clone()),
            state,
            store,
            remote,
            _staging: staging,
        }
    }

    /// Send a request with an optional JSON body and bearer token.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.send(request).await
    }

    /// Send a `multipart/form-data` request.
    pub async fn multipart(&self, uri: &str, parts: &[Part<'_>], token: &str) -> TestResponse {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File {
                    name,
                    content_type,
                    data,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\n\
                             Content-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request");

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }

    /// Register through the API and return the new user's ID.
    pub async fn register(&self, username: &str) -> Uuid {
        let response = self
            .request(
                "POST",
                "/api/auth/register",
                Some(serde_json::json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": PASSWORD,
                    "password_confirm": PASSWORD,
                })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["data"]["user"]["id"]
            .as_str()
            .and_then(|id| id.parse().ok())
            .expect("user id")
    }

    /// Log in through the API and return the access token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({ "username": username, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.body["data"]["access_token"]
            .as_str()
            .expect("token")
            .to_string()
    }

    /// A registered user still awaiting approval.
    pub async fn pending_user(&self, username: &str) -> (Uuid, String) {
        let id = self.register(username).await;
        (id, self.login(username, PASSWORD).await)
    }

    /// A registered and approved user.
    pub async fn approved_user(&self, username: &str) -> (Uuid, String) {
        let id = self.register(username).await;
        let admin = RequestContext::new(Uuid::new_v4(), UserRole::Admin, "root");
        self.state
            .approvals
            .approve(&admin, id)
            .await
            .expect("approve");
        (id, self.login(username, PASSWORD).await)
    }

    /// An administrator account and its token.
    pub async fn admin(&self) -> String {
        self.state
            .registration
            .create_admin("admin", "admin@example.com", PASSWORD)
            .await
            .expect("create admin");
        self.login("admin", PASSWORD).await
    }
}
