//! HTTP handlers, one module per concern.
//!
//! Every error body carries an `errorId` that also appears in the server log.

pub mod ask;
pub mod doc;
pub mod generate;
pub mod health;
pub mod models;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::error;
use uuid::Uuid;

use docask_llm::LlmError;

pub use ask::ask_with_files;
pub use generate::generate;
pub use health::{health, test_pdf};
pub use models::list_models;

// ── Shared error body ────────────────────────────────────────────

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    /// Upstream HTTP status, for text-generation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<Value>,
    pub error_id: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    error_with_details(status, message, None, None)
}

pub(crate) fn error_with_details(
    status: StatusCode,
    message: impl Into<String>,
    upstream_status: Option<u16>,
    details: Option<Value>,
) -> ApiError {
    let message = message.into();
    let error_id = Uuid::new_v4().to_string();
    error!(
        error_id = %error_id,
        status = status.as_u16(),
        upstream_status = ?upstream_status,
        details = ?details,
        "{message}"
    );
    (
        status,
        Json(ErrorResponse {
            error: message,
            status: upstream_status,
            details,
            error_id,
        }),
    )
}

/// Upstream error body as JSON when it parses, otherwise as a string.
pub(crate) fn upstream_details(err: &LlmError) -> Value {
    match err {
        LlmError::ApiError { body, .. } => {
            serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.clone()))
        }
        other => Value::String(other.to_string()),
    }
}

/// Gemini failure on a passthrough route: keep the upstream status, or 500.
pub(crate) fn gemini_upstream_error(err: &LlmError) -> ApiError {
    let status = err
        .status()
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_with_details(
        status,
        "Upstream error from Gemini",
        err.status(),
        Some(upstream_details(err)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_shape() {
        let (status, Json(body)) = api_error(StatusCode::BAD_REQUEST, "No files uploaded");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "No files uploaded");
        assert!(json.get("status").is_none());
        assert!(json.get("details").is_none());
        assert_eq!(json["errorId"].as_str().unwrap().len(), 36);
    }

    #[test]
    fn json_upstream_body_is_kept_structured() {
        let err = LlmError::ApiError {
            status: 429,
            body: r#"{"error":{"code":429,"message":"quota"}}"#.into(),
        };
        assert_eq!(upstream_details(&err)["error"]["code"], 429);

        let err = LlmError::ApiError { status: 502, body: "<html>bad gateway</html>".into() };
        assert_eq!(upstream_details(&err), Value::String("<html>bad gateway</html>".into()));
    }

    #[test]
    fn passthrough_error_keeps_upstream_status() {
        let err = LlmError::ApiError { status: 404, body: "{}".into() };
        let (status, Json(body)) = gemini_upstream_error(&err);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.status, Some(404));

        let (status, Json(body)) = gemini_upstream_error(&LlmError::Timeout(30));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.status, None);
    }
}
