//! Folder and file operations through the HTTP surface.

use axum::http::{StatusCode, header};
use serde_json::json;

use drivehub_database::FileStore;
use drivehub_entity::file::CreateFileRecord;
use drivehub_storage::RemoteOp;

use crate::helpers::{Part, TestApp};

async fn create_folder(app: &TestApp, token: &str, name: &str, parent: Option<i64>) -> i64 {
    let response = app
        .request(
            "POST",
            "/api/folders",
            Some(json!({ "name": name, "parent_id": parent })),
            Some(token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body["data"]["value"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_nested_folders_show_breadcrumbs() {
    let app = TestApp::new();
    let (_, token) = app.approved_user("alice").await;

    let a = create_folder(&app, &token, "a", None).await;
    let b = create_folder(&app, &token, "b", Some(a)).await;
    let c = create_folder(&app, &token, "c", Some(b)).await;

    let response = app
        .request("GET", &format!("/api/folders/{c}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let listing = &response.body["data"]["listing"];
    assert_eq!(response.body["data"]["state"], "ready");
    assert_eq!(listing["path"], "a/b/c");
    assert_eq!(listing["breadcrumbs"].as_array().unwrap().len(), 3);

    let root = app.request("GET", "/api/dashboard", None, Some(&token)).await;
    let folders = root.body["data"]["listing"]["folders"].as_array().unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0]["name"], "a");
}

#[tokio::test]
async fn test_upload_then_download() {
    let app = TestApp::new();
    let (_, token) = app.approved_user("alice").await;

    let response = app
        .multipart(
            "/api/upload",
            &[
                Part::Text("folder_name", "reports"),
                Part::Text("description", "quarterly"),
                Part::File {
                    name: "q1.txt",
                    content_type: "text/plain",
                    data: b"first quarter",
                },
                Part::File {
                    name: "q2.csv",
                    content_type: "text/csv",
                    data: b"a,b\n1,2\n",
                },
            ],
            &token,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let data = &response.body["data"];
    assert_eq!(data["folder"]["name"], "reports");
    assert_eq!(data["report"]["succeeded"], 2);
    assert_eq!(data["report"]["failed"], 0);

    let file_id = data["report"]["files"][0]["id"].as_i64().unwrap();
    let response = app
        .request(
            "GET",
            &format!("/api/files/{file_id}/download"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(&response.bytes[..], b"first quarter");
    assert_eq!(response.headers[header::CONTENT_TYPE], "text/plain");
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"q1.txt\""
    );
}

#[tokio::test]
async fn test_upload_counts_oversize_as_failure() {
    let app = TestApp::new();
    let (_, token) = app.approved_user("alice").await;

    let big = vec![b'x'; 65];
    let response = app
        .multipart(
            "/api/upload",
            &[
                Part::File {
                    name: "small.bin",
                    content_type: "application/octet-stream",
                    data: b"tiny",
                },
                Part::File {
                    name: "big.bin",
                    content_type: "application/octet-stream",
                    data: &big,
                },
            ],
            &token,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let report = &response.body["data"]["report"];
    assert_eq!(report["succeeded"], 1);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["failures"][0]["name"], "big.bin");
    assert_eq!(app.remote.calls(RemoteOp::Upload).await, 1);
}

#[tokio::test]
async fn test_empty_upload_form_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.approved_user("alice").await;
    let before = app.remote.total_calls().await;

    let response = app
        .multipart("/api/upload", &[Part::Text("description", "nothing")], &token)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        "You must either upload files or create a folder."
    );
    assert_eq!(app.remote.total_calls().await, before);
}

#[tokio::test]
async fn test_remote_failure_is_bad_gateway_and_writes_nothing() {
    let app = TestApp::new();
    let (_, token) = app.approved_user("alice").await;
    app.remote.fail_op(RemoteOp::CreateFolder).await;

    let response = app
        .request(
            "POST",
            "/api/folders",
            Some(json!({ "name": "docs" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["data"]["status"], "failed");
    assert_eq!(app.store.folder_count().await, 0);
}

#[tokio::test]
async fn test_other_users_records_are_not_found() {
    let app = TestApp::new();
    let (_, alice) = app.approved_user("alice").await;
    let (_, bob) = app.approved_user("bob").await;
    let folder = create_folder(&app, &alice, "private", None).await;
    let calls = app.remote.total_calls().await;

    let response = app
        .request("GET", &format!("/api/folders/{folder}"), None, Some(&bob))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request("DELETE", &format!("/api/folders/{folder}"), None, Some(&bob))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request("GET", "/api/files/999/download", None, Some(&bob))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    assert_eq!(app.remote.total_calls().await, calls);
}

#[tokio::test]
async fn test_delete_folder_cascades() {
    let app = TestApp::new();
    let (_, token) = app.approved_user("alice").await;
    let parent = create_folder(&app, &token, "parent", None).await;
    create_folder(&app, &token, "child", Some(parent)).await;

    let response = app
        .request("DELETE", &format!("/api/folders/{parent}"), None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "completed");
    assert_eq!(app.store.folder_count().await, 0);
}

#[tokio::test]
async fn test_delete_file_keeps_record_when_remote_fails() {
    let app = TestApp::new();
    let (_, token) = app.approved_user("alice").await;
    let response = app
        .multipart(
            "/api/upload",
            &[Part::File {
                name: "keep.txt",
                content_type: "text/plain",
                data: b"keep",
            }],
            &token,
        )
        .await;
    let file_id = response.body["data"]["report"]["files"][0]["id"]
        .as_i64()
        .unwrap();

    app.remote.fail_op(RemoteOp::Delete).await;
    let response = app
        .request("DELETE", &format!("/api/files/{file_id}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(app.store.file_count().await, 1);

    app.remote.clear_failures().await;
    let response = app
        .request("DELETE", &format!("/api/files/{file_id}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.store.file_count().await, 0);
}

#[tokio::test]
async fn test_verify_reports_untracked_objects() {
    let app = TestApp::new();
    let (_, token) = app.approved_user("alice").await;
    let folder = create_folder(&app, &token, "docs", None).await;
    let remote_id = app
        .request("GET", &format!("/api/folders/{folder}"), None, Some(&token))
        .await
        .body["data"]["listing"]["folder"]["remote_id"]
        .as_str()
        .unwrap()
        .to_string();
    app.remote
        .insert_out_of_band("stray.txt", &remote_id, "x".into())
        .await;

    let response = app
        .request(
            "GET",
            &format!("/api/folders/{folder}/verify"),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let report = &response.body["data"]["value"];
    assert_eq!(report["untracked"].as_array().unwrap().len(), 1);
    assert_eq!(report["untracked"][0]["name"], "stray.txt");
    assert!(report["stale_files"].as_array().unwrap().is_empty());

    let response = app.request("GET", "/api/verify", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_download_sanitizes_stored_name_and_content_type() {
    let app = TestApp::new();
    let (alice, token) = app.approved_user("alice").await;
    let remote_id = app
        .remote
        .insert_out_of_band("odd.txt", "unused-parent", "payload".into())
        .await;
    let file = FileStore::create(
        &app.store,
        &CreateFileRecord {
            owner_id: alice,
            name: "odd\r\nname\".txt".to_string(),
            size_bytes: 7,
            content_type: Some("text/plain\nX-Injected: 1".to_string()),
            remote_id,
            description: None,
            folder_id: None,
        },
    )
    .await
    .unwrap();

    let response = app
        .request(
            "GET",
            &format!("/api/files/{}/download", file.id),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(&response.bytes[..], b"payload");
    assert_eq!(
        response.headers[header::CONTENT_TYPE],
        "application/octet-stream"
    );
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"odd__name_.txt\""
    );
}
