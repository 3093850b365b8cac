use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{debug, info};

use docask_core::{AskResponse, UploadedFile};
use docask_ingest::AskError;

use super::{api_error, error_with_details, upstream_details, ApiError, ErrorResponse};
use crate::state::AppState;

// ── POST /api/ask-with-files ─────────────────────

/// Ask a question about uploaded files
///
/// Accepts multipart/form-data with up to the configured number of `files`
/// parts and an optional `question` field. Every file is extracted
/// independently; failures are reported per file in `files[].error`.
#[utoipa::path(
    post,
    path = "/api/ask-with-files",
    tag = "Ask",
    request_body(content_type = "multipart/form-data", description = "`files` parts and a `question` field"),
    responses(
        (status = 200, description = "Extracted context, answer and per-file metadata", body = AskResponse),
        (status = 400, description = "No files, too many files, or malformed multipart", body = ErrorResponse),
        (status = 413, description = "A file exceeds the size limit", body = ErrorResponse),
        (status = 502, description = "Text generation failed upstream", body = ErrorResponse)
    )
)]
pub async fn ask_with_files(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AskResponse>, ApiError> {
    let limits = &state.config.upload;
    let mut files = Vec::new();
    let mut question = String::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "files" => {
                if files.len() >= limits.max_files {
                    return Err(api_error(
                        StatusCode::BAD_REQUEST,
                        format!("Too many files (max {})", limits.max_files),
                    ));
                }
                let filename = field.file_name().unwrap_or("unnamed").to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if bytes.len() > limits.max_file_bytes {
                    return Err(api_error(
                        StatusCode::PAYLOAD_TOO_LARGE,
                        format!(
                            "File '{filename}' exceeds the {} byte limit",
                            limits.max_file_bytes
                        ),
                    ));
                }
                debug!(file = %filename, bytes = bytes.len(), "Received upload");
                files.push(UploadedFile::new(filename, bytes));
            }
            "question" => question = field.text().await.map_err(multipart_error)?,
            other => debug!(field = other, "Ignoring unknown multipart field"),
        }
    }

    info!(files = files.len(), question_chars = question.chars().count(), "ask-with-files");
    let response = state.engine.ask(files, &question).await.map_err(ask_error)?;
    Ok(Json(response))
}

fn multipart_error(e: MultipartError) -> ApiError {
    // Body-limit overruns surface here with 413.
    api_error(e.status(), format!("Multipart error: {}", e.body_text()))
}

fn ask_error(e: AskError) -> ApiError {
    match e {
        AskError::NoFiles => api_error(StatusCode::BAD_REQUEST, e.to_string()),
        AskError::Upstream(err) => error_with_details(
            StatusCode::BAD_GATEWAY,
            "Text generation failed",
            err.status(),
            Some(upstream_details(&err)),
        ),
    }
}
