//! Upload, download, and delete handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use drivehub_core::error::AppError;
use drivehub_entity::file::DEFAULT_CONTENT_TYPE;
use drivehub_service::{MirrorOutcome, UploadRequest, UploadSummary};

use crate::dto::response::{ApiResponse, outcome_response};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

fn multipart_error(e: MultipartError) -> AppError {
    AppError::validation(format!("Multipart error: {e}"))
}

/// File name safe to quote in `Content-Disposition`.
fn attachment_name(name: &str) -> String {
    name.chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect()
}

/// Stored content type, or the generic binary type when it cannot be
/// sent as a header value.
fn content_type_header(content_type: &str) -> HeaderValue {
    HeaderValue::from_str(content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE))
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// POST /api/upload (multipart form)
///
/// Fields: any number of file parts, plus optional `description`,
/// `folder_name` and `parent_id`. File parts are streamed to the
/// staging directory as they arrive.
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<ApiResponse<UploadSummary>>> {
    let mut request = UploadRequest::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        // Browsers send an empty, unnamed part when no file was chosen.
        let file_name = field
            .file_name()
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        if let Some(file_name) = file_name {
            let content_type = field.content_type().map(str::to_string);
            let mut staged = state
                .stager
                .begin(&file_name, content_type.as_deref())
                .await?;
            while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                staged.write_chunk(&chunk).await?;
            }
            staged.finish().await?;
            request.files.push(staged);
            continue;
        }

        let name = field.name().unwrap_or_default().to_string();
        let text = field.text().await.map_err(multipart_error)?;
        match name.as_str() {
            "description" => request.description = non_blank(text),
            "folder_name" => request.folder_name = non_blank(text),
            "parent_id" => {
                request.parent_id = match non_blank(text) {
                    Some(id) => Some(
                        id.parse::<i64>()
                            .map_err(|_| AppError::validation("Invalid parent_id"))?,
                    ),
                    None => None,
                }
            }
            _ => {}
        }
    }

    let summary = state.mirror.upload(&auth, request).await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// GET /api/files/{id}/download
pub async fn download_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let result = match state.mirror.download(&auth, id).await? {
        MirrorOutcome::Completed { value } => value,
        failed @ MirrorOutcome::Failed { .. } => {
            return Ok(outcome_response(failed.map(|_| ()), StatusCode::OK));
        }
    };

    let filename = attachment_name(&result.file.name);
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_header(&result.content_type))
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .header(header::CONTENT_LENGTH, result.data.len())
        .body(Body::from(result.data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response.into_response())
}

/// DELETE /api/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let outcome = state.mirror.delete_file(&auth, id).await?;
    Ok(outcome_response(outcome, StatusCode::OK))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_name_strips_quotes_and_control_characters() {
        assert_eq!(attachment_name("report.pdf"), "report.pdf");
        assert_eq!(attachment_name("a\"b\\c.txt"), "a_b_c.txt");
        assert_eq!(attachment_name("line\r\nbreak\u{7f}.txt"), "line__break_.txt");
        assert_eq!(attachment_name("résumé.txt"), "résumé.txt");
    }

    #[test]
    fn test_invalid_content_type_falls_back() {
        assert_eq!(content_type_header("text/plain"), "text/plain");
        assert_eq!(content_type_header("text/plain\nX-Evil: 1"), DEFAULT_CONTENT_TYPE);
    }
}
