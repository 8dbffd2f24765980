//! Registration, login, and token handling.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["remote_provider"], "memory");
}

#[tokio::test]
async fn test_register_creates_pending_profile() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": PASSWORD,
                "password_confirm": PASSWORD,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["profile"]["is_approved"], false);
    assert!(response.body["data"]["user"].get("password_hash").is_none());
    assert!(
        response.body["data"]["message"]
            .as_str()
            .unwrap()
            .contains("approval")
    );
}

#[tokio::test]
async fn test_register_rejects_mismatched_passwords() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": PASSWORD,
                "password_confirm": "something-else",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let app = TestApp::new();
    app.register("alice").await;
    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "alice",
                "email": "other@example.com",
                "password": PASSWORD,
                "password_confirm": PASSWORD,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new();
    app.register("alice").await;
    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "alice", "password": "wrong-password" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "AUTHENTICATION");
}

#[tokio::test]
async fn test_missing_and_bad_tokens_are_rejected() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/dashboard", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/api/dashboard", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_pending_user_sees_notice_and_is_gated() {
    let app = TestApp::new();
    let (_, token) = app.pending_user("alice").await;

    let response = app.request("GET", "/api/dashboard", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["state"], "pending");

    let response = app
        .request(
            "POST",
            "/api/folders",
            Some(json!({ "name": "docs" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(app.remote.total_calls().await, 0);
}

#[tokio::test]
async fn test_settings_share_email() {
    let app = TestApp::new();
    let (_, token) = app.pending_user("alice").await;

    let response = app
        .request(
            "PUT",
            "/api/settings",
            Some(json!({ "share_email": "me@gmail.com" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["share_email"], "me@gmail.com");

    let response = app
        .request(
            "PUT",
            "/api/settings",
            Some(json!({ "share_email": "nope" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request("PUT", "/api/settings", Some(json!({ "share_email": null })), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"]["share_email"].is_null());
}
