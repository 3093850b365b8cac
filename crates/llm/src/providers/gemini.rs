use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::provider::{LlmError, LlmProvider, Message, Role};

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiProvider {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key,
        )
    }

    fn models_endpoint(&self) -> String {
        format!("{}/v1beta/models?key={}", self.base_url, self.api_key)
    }

    /// Build the request body for the Gemini generateContent API.
    fn build_request_body(
        messages: &[Message],
        temperature: f32,
        max_tokens: u32,
    ) -> serde_json::Value {
        // Gemini takes the system prompt as a separate system_instruction field
        let system_msg = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>();

        let contents: Vec<serde_json::Value> = messages
            .iter()
            .filter_map(|m| {
                let role = match m.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                    Role::System => return None,
                };
                Some(json!({
                    "role": role,
                    "parts": [{ "text": m.content }],
                }))
            })
            .collect();

        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "temperature": temperature,
                "maxOutputTokens": max_tokens,
            },
        });

        if !system_msg.is_empty() {
            body["system_instruction"] = json!({
                "parts": [{ "text": system_msg.join("\n\n") }],
            });
        }

        body
    }

    /// Pull the first candidate's text out of a generateContent response.
    fn parse_answer(resp: &serde_json::Value) -> Result<String, LlmError> {
        let parts = resp["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| LlmError::ParseError("missing candidates[0].content.parts".into()))?;

        let text: String = parts
            .iter()
            .filter_map(|p| p["text"].as_str())
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            let reason = resp["candidates"][0]["finishReason"]
                .as_str()
                .unwrap_or("unknown");
            return Err(LlmError::ParseError(format!(
                "candidate contained no text (finishReason={reason})"
            )));
        }
        Ok(text)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let body = Self::build_request_body(&messages, temperature, max_tokens);

        debug!("Gemini request to model={}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, body });
        }

        let resp: serde_json::Value = response.json().await.map_err(|e| self.map_transport(e))?;
        Self::parse_answer(&resp)
    }

    async fn list_models(&self) -> Result<serde_json::Value, LlmError> {
        debug!("Gemini model listing from {}", self.base_url);

        let response = self
            .client
            .get(self.models_endpoint())
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, body });
        }

        response.json().await.map_err(|e| self.map_transport(e))
    }
}

impl GeminiProvider {
    fn map_transport(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout.as_secs())
        } else {
            LlmError::HttpError(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Message, Role};

    #[test]
    fn test_request_body_structure() {
        let messages = vec![
            Message { role: Role::System, content: "You are helpful.".into() },
            Message { role: Role::User, content: "Hello".into() },
            Message { role: Role::Assistant, content: "Hi there!".into() },
            Message { role: Role::User, content: "How are you?".into() },
        ];

        let body = GeminiProvider::build_request_body(&messages, 0.1, 4096);

        assert_eq!(
            body["system_instruction"]["parts"][0]["text"].as_str().unwrap(),
            "You are helpful.",
        );

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "Hello");
        // Gemini calls the assistant "model"
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "How are you?");

        let temp = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.1).abs() < 1e-6, "temperature should be ~0.1, got {temp}");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 4096);
    }

    #[test]
    fn test_request_body_without_system() {
        let messages = vec![Message::user("Hello")];

        let body = GeminiProvider::build_request_body(&messages, 0.5, 2048);

        assert!(body.get("system_instruction").is_none());
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["role"], "user");
    }

    #[test]
    fn parses_first_candidate_text() {
        let resp = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Blue" }, { "text": "." }] },
                "finishReason": "STOP",
            }]
        });
        assert_eq!(GeminiProvider::parse_answer(&resp).unwrap(), "Blue.");
    }

    #[test]
    fn blocked_candidate_is_parse_error() {
        let resp = json!({ "candidates": [{ "finishReason": "SAFETY" }] });
        assert!(matches!(
            GeminiProvider::parse_answer(&resp),
            Err(LlmError::ParseError(_))
        ));
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let provider = GeminiProvider::new(
            "k".into(),
            "gemini-2.5-flash".into(),
            "http://localhost:9999/".into(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            provider.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent?key=k"
        );
        assert_eq!(
            provider.models_endpoint(),
            "http://localhost:9999/v1beta/models?key=k"
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_http_error() {
        let provider = GeminiProvider::new(
            "k".into(),
            "m".into(),
            "http://127.0.0.1:1".into(),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = provider
            .complete(vec![Message::user("hi")], 0.1, 16)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::HttpError(_) | LlmError::Timeout(_)));
    }

    #[tokio::test]
    async fn model_listing_from_unreachable_host_is_http_error() {
        let provider = GeminiProvider::new(
            "k".into(),
            "m".into(),
            "http://127.0.0.1:1".into(),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = provider.list_models().await.unwrap_err();
        assert!(matches!(err, LlmError::HttpError(_) | LlmError::Timeout(_)));
    }
}
