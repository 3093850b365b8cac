//! OpenAPI documentation aggregator.
//!
//! Collects the `#[utoipa::path]`-annotated handlers and `ToSchema`-derived
//! types into a single OpenAPI document, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "docask API",
        version = "0.1.0",
        description = "Extract text from uploaded documents and images, then answer questions about it.",
    ),
    tags(
        (name = "Ask", description = "Multipart upload, per-file extraction and question answering"),
        (name = "Generate", description = "Direct Gemini conversation passthrough and model listing"),
        (name = "Health", description = "Liveness, capabilities and parser probe"),
    ),
    paths(
        crate::api::ask::ask_with_files,
        crate::api::generate::generate,
        crate::api::models::list_models,
        crate::api::health::health,
        crate::api::health::test_pdf,
    ),
    components(schemas(
        docask_core::AskResponse,
        docask_core::FileSummary,
        crate::api::ErrorResponse,
        crate::api::generate::GenerateRequest,
        crate::api::generate::ConversationTurn,
        crate::api::generate::GenerateResponse,
        crate::api::health::HealthResponse,
        crate::api::health::Capabilities,
        crate::api::health::PdfProbeResponse,
    ))
)]
pub struct ApiDoc;
