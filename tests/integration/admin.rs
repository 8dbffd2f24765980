//! Administrator approval endpoints.

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use drivehub_storage::RemoteOp;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_non_admin_is_forbidden() {
    let app = TestApp::new();
    let (_, token) = app.approved_user("alice").await;

    let response = app
        .request("GET", "/api/admin/dashboard", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "AUTHORIZATION");
}

#[tokio::test]
async fn test_approve_creates_root_and_opens_gate() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let (alice, token) = app.pending_user("alice").await;

    let dashboard = app
        .request("GET", "/api/admin/dashboard", None, Some(&admin))
        .await;
    assert_eq!(dashboard.status, StatusCode::OK);
    let pending = dashboard.body["data"]["pending"].as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["username"], "alice");

    let response = app
        .request(
            "POST",
            &format!("/api/admin/users/{alice}/approve"),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["changed"], true);
    let root = response.body["data"]["remote_root_id"].as_str().unwrap();
    assert!(app.remote.contains(root).await);
    assert_eq!(app.remote.calls(RemoteOp::CreateFolder).await, 1);

    let response = app.request("GET", "/api/dashboard", None, Some(&token)).await;
    assert_eq!(response.body["data"]["state"], "ready");

    let response = app
        .request(
            "POST",
            &format!("/api/admin/users/{alice}/revoke"),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", "/api/dashboard", None, Some(&token)).await;
    assert_eq!(response.body["data"]["state"], "pending");
}

#[tokio::test]
async fn test_approval_stands_when_root_creation_fails() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let (alice, _) = app.pending_user("alice").await;
    app.remote.fail_op(RemoteOp::CreateFolder).await;

    let response = app
        .request(
            "POST",
            &format!("/api/admin/users/{alice}/approve"),
            None,
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["state"], "approved");
    assert!(response.body["data"]["remote_root_id"].is_null());
}

#[tokio::test]
async fn test_bulk_approve_and_revoke_count_changes() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let (alice, _) = app.pending_user("alice").await;
    let (bob, _) = app.pending_user("bob").await;
    let (carol, _) = app.approved_user("carol").await;

    let response = app
        .request(
            "POST",
            "/api/admin/users/approve",
            Some(json!({ "user_ids": [alice, bob, carol] })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["count"], 2);

    let response = app
        .request(
            "POST",
            "/api/admin/users/revoke",
            Some(json!({ "user_ids": [alice] })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.body["data"]["count"], 1);

    let response = app
        .request(
            "POST",
            "/api/admin/users/revoke",
            Some(json!({ "user_ids": [bob, Uuid::new_v4()] })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    let dashboard = app
        .request("GET", "/api/admin/dashboard", None, Some(&admin))
        .await;
    let approved = dashboard.body["data"]["approved"].as_array().unwrap();
    assert!(approved.iter().any(|u| u["username"] == "bob"));

    let response = app
        .request(
            "POST",
            "/api/admin/users/revoke",
            Some(json!({ "user_ids": [] })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
