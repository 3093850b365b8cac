use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use tracing::info;

use super::{api_error, gemini_upstream_error, ApiError, ErrorResponse};
use crate::state::AppState;

// ── GET /api/models ─────────────────────────────

/// List the models available to the configured Gemini key
///
/// The upstream listing is returned as-is.
#[utoipa::path(
    get,
    path = "/api/models",
    tag = "Generate",
    responses(
        (status = 200, description = "Gemini model listing", body = Object),
        (status = 500, description = "No API key configured, or upstream failure without a status", body = ErrorResponse)
    )
)]
pub async fn list_models(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let generator = state
        .generator()
        .ok_or_else(|| api_error(StatusCode::INTERNAL_SERVER_ERROR, "Missing API key"))?;

    let listing = generator
        .list_models()
        .await
        .map_err(|err| gemini_upstream_error(&err))?;

    let count = listing["models"].as_array().map_or(0, Vec::len);
    info!(count, "gemini models listed");
    Ok(Json(listing))
}
