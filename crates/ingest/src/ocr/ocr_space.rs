use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{OcrEngine, OcrError};

/// Remote OCR through the OCR.Space `parse/image` API.
pub struct OcrSpaceEngine {
    client: Client,
    api_key: String,
    url: String,
    language: String,
}

impl OcrSpaceEngine {
    pub fn new(
        api_key: String,
        url: String,
        language: String,
        timeout: Duration,
    ) -> Result<Self, OcrError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            url,
            language,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpaceResponse {
    #[serde(default)]
    parsed_results: Option<Vec<ParsedResult>>,
    #[serde(default)]
    is_errored_on_processing: bool,
    /// A string or an array of strings, depending on the failure.
    #[serde(default)]
    error_message: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ParsedResult {
    #[serde(default)]
    parsed_text: Option<String>,
}

impl OcrSpaceResponse {
    /// Parsed segments joined by newline; an API error only when no text came back.
    fn into_text(self) -> Result<String, OcrError> {
        let text = self
            .parsed_results
            .unwrap_or_default()
            .into_iter()
            .filter_map(|r| r.parsed_text)
            .collect::<Vec<_>>()
            .join("\n");
        if !text.trim().is_empty() {
            return Ok(text);
        }

        let message = match self.error_message {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            _ => None,
        };
        match message {
            Some(m) if !m.is_empty() => Err(OcrError::Api(m)),
            _ if self.is_errored_on_processing => {
                Err(OcrError::Api("processing failed without a message".to_string()))
            }
            _ => Ok(text),
        }
    }
}

#[async_trait]
impl OcrEngine for OcrSpaceEngine {
    fn name(&self) -> &'static str {
        "ocr.space"
    }

    async fn recognize(&self, image: Bytes, filename: &str) -> Result<String, OcrError> {
        debug!("OCR.Space request for {} ({} bytes)", filename, image.len());

        let file = Part::bytes(image.to_vec()).file_name(filename.to_string());
        let form = Form::new()
            .text("apikey", self.api_key.clone())
            .text("language", self.language.clone())
            .part("file", file);

        let response = self.client.post(&self.url).multipart(form).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Api(format!("{status}: {body}")));
        }

        let body = response.text().await?;
        let parsed: OcrSpaceResponse =
            serde_json::from_str(&body).map_err(|e| OcrError::Parse(e.to_string()))?;
        parsed.into_text()
    }
}
