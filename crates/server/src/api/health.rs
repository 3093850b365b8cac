//! Liveness, capability reporting and the PDF backend probe.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use docask_ingest::document::PDF_BACKEND;

use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct Capabilities {
    pub remote_ocr: bool,
    pub local_ocr: bool,
    pub text_generation: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub capabilities: Capabilities,
    /// Active configuration with secrets removed.
    #[schema(value_type = Object)]
    pub config: Value,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PdfProbeResponse {
    pub status: String,
    pub backend: String,
}

/// Health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Server is up", body = HealthResponse))
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let engines = state.engine.extractor().ocr().engine_names();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        capabilities: Capabilities {
            remote_ocr: engines.contains(&"ocr.space"),
            local_ocr: engines.contains(&"tesseract"),
            text_generation: state.engine.can_answer(),
        },
        config: state.config.redacted_summary(),
    })
}

/// PDF backend probe
#[utoipa::path(
    get,
    path = "/api/test-pdf",
    tag = "Health",
    responses((status = 200, description = "PDF parser is linked in", body = PdfProbeResponse))
)]
pub async fn test_pdf() -> Json<PdfProbeResponse> {
    Json(PdfProbeResponse {
        status: "PDF backend loaded successfully".to_string(),
        backend: PDF_BACKEND.to_string(),
    })
}
