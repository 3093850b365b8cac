use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use docask_llm::{LlmError, Message, Role};

use super::{api_error, gemini_upstream_error, ApiError, ErrorResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub conversation: Vec<ConversationTurn>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ConversationTurn {
    /// `user`, `assistant` (or `model`), or `system`.
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct GenerateResponse {
    /// `null` when the model returned no text (e.g. a blocked candidate).
    pub response: Option<String>,
}

impl GenerateRequest {
    fn into_messages(self) -> Vec<Message> {
        let system = self
            .system_prompt
            .filter(|p| !p.trim().is_empty())
            .map(Message::system);
        let turns = self.conversation.into_iter().map(|turn| {
            let role = match turn.role.as_str() {
                "assistant" | "model" => Role::Assistant,
                "system" => Role::System,
                _ => Role::User,
            };
            Message { role, content: turn.content }
        });
        system.into_iter().chain(turns).collect()
    }
}

// ── POST /api/gemini ─────────────────────────────

/// Forward a conversation to Gemini
#[utoipa::path(
    post,
    path = "/api/gemini",
    tag = "Generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Model reply", body = GenerateResponse),
        (status = 500, description = "No API key configured, or upstream failure without a status", body = ErrorResponse)
    )
)]
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let generator = state
        .generator()
        .ok_or_else(|| api_error(StatusCode::INTERNAL_SERVER_ERROR, "Missing API key"))?;

    let messages = req.into_messages();
    info!(messages = messages.len(), model = %state.config.llm.gemini_model, "gemini passthrough");

    match generator
        .complete(messages, state.config.llm.temperature, state.config.llm.max_tokens)
        .await
    {
        Ok(text) => Ok(Json(GenerateResponse { response: Some(text) })),
        Err(LlmError::ParseError(reason)) => {
            warn!(%reason, "Gemini returned no text");
            Ok(Json(GenerateResponse { response: None }))
        }
        Err(err) => Err(gemini_upstream_error(&err)),
    }
}
