//! Google Drive v3 REST client.

pub mod credentials;
pub mod token;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Response, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use drivehub_core::config::RemoteConfig;
use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_core::traits::remote::{FOLDER_MIME_TYPE, RemoteKind, RemoteObject, RemoteStorage};

use self::credentials::ServiceAccountKey;
use self::token::TokenSource;

const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType, size, createdTime)";
const LIST_PAGE_SIZE: &str = "1000";

#[derive(Debug, Deserialize)]
struct CreatedObject {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    mime_type: String,
    size: Option<String>,
    created_time: Option<DateTime<Utc>>,
}

impl From<DriveFile> for RemoteObject {
    fn from(f: DriveFile) -> Self {
        Self {
            kind: RemoteKind::from_mime_type(&f.mime_type),
            size: f.size.and_then(|s| s.parse().ok()),
            id: f.id,
            name: f.name,
            created_time: f.created_time,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

/// Drive client authenticated as a service account.
#[derive(Debug)]
pub struct GoogleDriveClient {
    http: reqwest::Client,
    tokens: TokenSource,
    api_base: String,
    upload_base: String,
}

impl GoogleDriveClient {
    /// Build a client from configuration, reading the key file.
    ///
    /// A missing or unusable key file yields `RemoteUnavailable`.
    pub async fn from_config(config: &RemoteConfig) -> AppResult<Self> {
        let key = ServiceAccountKey::load(Path::new(&config.credentials_path)).await?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::RemoteUnavailable, "Failed to build HTTP client", e)
            })?;
        let tokens = TokenSource::new(http.clone(), &key, Some(config.token_url.as_str()))?;

        debug!(client_email = %key.client_email, "Drive client initialized");
        Ok(Self {
            http,
            tokens,
            api_base: config.api_base_url.trim_end_matches('/').to_string(),
            upload_base: config.upload_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Obtain an access token without touching any file.
    pub async fn verify_token(&self) -> AppResult<()> {
        self.tokens.access_token().await.map(|_| ())
    }

    async fn bearer(&self) -> AppResult<String> {
        Ok(format!("Bearer {}", self.tokens.access_token().await?))
    }

    fn url(&self, base: &str, path: &str) -> AppResult<Url> {
        Url::parse(&format!("{base}/{path}")).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid Drive API URL", e)
        })
    }

    /// Grant `email` writer access to an object. Failures are logged only.
    async fn share(&self, id: &str, email: &str) {
        if let Err(e) = self.grant_writer(id, email).await {
            warn!(
                remote_id = %id,
                email = %email,
                error = %e.chain(),
                "Failed to share remote object"
            );
        }
    }

    async fn grant_writer(&self, id: &str, email: &str) -> AppResult<()> {
        let mut url = self.url(&self.api_base, &format!("files/{id}/permissions"))?;
        url.query_pairs_mut()
            .append_pair("sendNotificationEmail", "false");
        let resp = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.bearer().await?)
            .json(&json!({ "type": "user", "role": "writer", "emailAddress": email }))
            .send()
            .await
            .map_err(|e| transport_error("share", e))?;
        check(resp, "share").await.map(|_| ())
    }
}

fn transport_error(op: &str, e: reqwest::Error) -> AppError {
    AppError::with_source(ErrorKind::RemoteCall, format!("Drive {op} request failed"), e)
}

/// Turn a non-2xx response into a `RemoteCall` error carrying the body.
async fn check(resp: Response, op: &str) -> AppResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(AppError::remote_call(format!(
        "Drive {op} returned {status}: {}",
        body.trim()
    )))
}

/// Assemble a `multipart/related` body: JSON metadata, then the media.
pub fn multipart_related(
    boundary: &str,
    metadata: &serde_json::Value,
    content_type: &str,
    data: &[u8],
) -> Bytes {
    let mut body = BytesMut::with_capacity(data.len() + 512);
    body.put_slice(format!("--{boundary}\r\n").as_bytes());
    body.put_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.put_slice(metadata.to_string().as_bytes());
    body.put_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.put_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.put_slice(data);
    body.put_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body.freeze()
}

#[async_trait]
impl RemoteStorage for GoogleDriveClient {
    fn provider_type(&self) -> &str {
        "google_drive"
    }

    async fn create_folder(
        &self,
        name: &str,
        parent_id: Option<&str>,
        share_email: Option<&str>,
    ) -> AppResult<String> {
        let mut metadata = json!({ "name": name, "mimeType": FOLDER_MIME_TYPE });
        if let Some(parent) = parent_id {
            metadata["parents"] = json!([parent]);
        }

        let mut url = self.url(&self.api_base, "files")?;
        url.query_pairs_mut().append_pair("fields", "id");
        let resp = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.bearer().await?)
            .json(&metadata)
            .send()
            .await
            .map_err(|e| transport_error("create folder", e))?;
        let created: CreatedObject = check(resp, "create folder")
            .await?
            .json()
            .await
            .map_err(|e| transport_error("create folder", e))?;

        if let Some(email) = share_email {
            self.share(&created.id, email).await;
        }
        Ok(created.id)
    }

    async fn upload_file(
        &self,
        data: Bytes,
        name: &str,
        content_type: &str,
        parent_id: &str,
        share_email: Option<&str>,
    ) -> AppResult<String> {
        let boundary = format!("drivehub-{}", uuid::Uuid::new_v4().simple());
        let metadata = json!({ "name": name, "parents": [parent_id] });
        let body = multipart_related(&boundary, &metadata, content_type, &data);

        let mut url = self.url(&self.upload_base, "files")?;
        url.query_pairs_mut()
            .append_pair("uploadType", "multipart")
            .append_pair("fields", "id");
        let resp = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.bearer().await?)
            .header(CONTENT_TYPE, format!("multipart/related; boundary={boundary}"))
            .body(body)
            .send()
            .await
            .map_err(|e| transport_error("upload", e))?;
        let created: CreatedObject = check(resp, "upload")
            .await?
            .json()
            .await
            .map_err(|e| transport_error("upload", e))?;

        if let Some(email) = share_email {
            self.share(&created.id, email).await;
        }
        Ok(created.id)
    }

    async fn download_file(&self, id: &str) -> AppResult<Bytes> {
        let mut url = self.url(&self.api_base, &format!("files/{id}"))?;
        url.query_pairs_mut().append_pair("alt", "media");
        let resp = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.bearer().await?)
            .send()
            .await
            .map_err(|e| transport_error("download", e))?;
        check(resp, "download")
            .await?
            .bytes()
            .await
            .map_err(|e| transport_error("download", e))
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let url = self.url(&self.api_base, &format!("files/{id}"))?;
        let resp = self
            .http
            .delete(url)
            .header(AUTHORIZATION, self.bearer().await?)
            .send()
            .await
            .map_err(|e| transport_error("delete", e))?;
        check(resp, "delete").await.map(|_| ())
    }

    async fn list_children(&self, parent_id: &str) -> AppResult<Vec<RemoteObject>> {
        let query = format!("'{}' in parents and trashed = false", parent_id.replace('\'', "\\'"));
        let mut out = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.url(&self.api_base, "files")?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs
                    .append_pair("q", &query)
                    .append_pair("fields", LIST_FIELDS)
                    .append_pair("pageSize", LIST_PAGE_SIZE);
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }

            let resp = self
                .http
                .get(url)
                .header(AUTHORIZATION, self.bearer().await?)
                .send()
                .await
                .map_err(|e| transport_error("list", e))?;
            let page: FileList = check(resp, "list")
                .await?
                .json()
                .await
                .map_err(|e| transport_error("list", e))?;

            out.extend(page.files.into_iter().map(RemoteObject::from));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipart_related_layout() {
        let body = multipart_related(
            "b",
            &json!({ "name": "a.txt" }),
            "text/plain",
            b"hello",
        );
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(
            text,
            "--b\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{\"name\":\"a.txt\"}\r\n\
             --b\r\nContent-Type: text/plain\r\n\r\nhello\r\n--b--\r\n"
        );
    }

    #[test]
    fn test_file_list_parses_drive_json() {
        let raw = r#"{
            "nextPageToken": "abc",
            "files": [
                {"id": "1", "name": "docs", "mimeType": "application/vnd.google-apps.folder",
                 "createdTime": "2024-05-01T10:00:00.000Z"},
                {"id": "2", "name": "a.pdf", "mimeType": "application/pdf", "size": "2048"}
            ]
        }"#;
        let list: FileList = serde_json::from_str(raw).unwrap();
        assert_eq!(list.next_page_token.as_deref(), Some("abc"));
        let objects: Vec<RemoteObject> = list.files.into_iter().map(Into::into).collect();
        assert_eq!(objects[0].kind, RemoteKind::Folder);
        assert!(objects[0].created_time.is_some());
        assert_eq!(objects[1].kind, RemoteKind::File);
        assert_eq!(objects[1].size, Some(2048));
    }
}
