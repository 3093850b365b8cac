//! Batch orchestration: extract every uploaded file, assemble the context
//! blob, and answer the caller's question against it.

mod context;
mod diagnostics;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tracing::{info, warn};

use docask_core::{AskResponse, Config, UploadedFile};
use docask_llm::{create_provider, LlmError, LlmProvider, Message};

use crate::extractor::{ExtractionResult, Extractor};

pub use context::{build_context, build_prompt, truncate_chars};
pub use diagnostics::{empty_extraction_answer, extraction_error_summary};

#[derive(Debug, Error)]
pub enum AskError {
    #[error("No files uploaded")]
    NoFiles,
    #[error("text generation failed: {0}")]
    Upstream(#[from] LlmError),
}

#[derive(Debug, Clone)]
pub struct AskSettings {
    /// Per-file character cap applied while building the context blob.
    pub context_char_cap: usize,
    pub temperature: f32,
    pub max_tokens: u32,
    pub llm_timeout: Duration,
}

impl AskSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            context_char_cap: config.upload.context_char_cap,
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
            llm_timeout: config.llm.timeout(),
        }
    }
}

#[derive(Clone)]
pub struct AskEngine {
    extractor: Extractor,
    generator: Option<Arc<dyn LlmProvider>>,
    settings: AskSettings,
}

impl AskEngine {
    pub fn new(
        extractor: Extractor,
        generator: Option<Arc<dyn LlmProvider>>,
        settings: AskSettings,
    ) -> Self {
        Self {
            extractor,
            generator,
            settings,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let extractor = Extractor::from_config(config)?;
        let generator = create_provider(&config.llm)?;
        if generator.is_none() {
            warn!("No GEMINI_API_KEY configured; answers are disabled");
        }
        Ok(Self::new(extractor, generator, AskSettings::from_config(config)))
    }

    /// Same engine with answering disabled.
    pub fn without_generator(mut self) -> Self {
        self.generator = None;
        self
    }

    pub fn can_answer(&self) -> bool {
        self.generator.is_some()
    }

    pub fn generator(&self) -> Option<&Arc<dyn LlmProvider>> {
        self.generator.as_ref()
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Extract all files concurrently. Results keep the input order.
    pub async fn extract_all(&self, files: &[UploadedFile]) -> Vec<ExtractionResult> {
        join_all(files.iter().map(|file| self.extractor.extract(file))).await
    }

    pub async fn ask(
        &self,
        files: Vec<UploadedFile>,
        question: &str,
    ) -> Result<AskResponse, AskError> {
        if files.is_empty() {
            return Err(AskError::NoFiles);
        }

        info!(files = files.len(), "Processing ask request");
        let results = self.extract_all(&files).await;
        let extracted = build_context(&results, self.settings.context_char_cap);
        info!(context_chars = extracted.chars().count(), "Context assembled");

        let mut response = AskResponse {
            extracted,
            answer: None,
            files: results.iter().map(ExtractionResult::summary).collect(),
            error: None,
        };

        let Some(generator) = &self.generator else {
            return Ok(response);
        };

        if response.extracted.trim().is_empty() {
            info!("No text extracted from any file, returning diagnostics");
            response.error = Some(extraction_error_summary(&results));
            response.answer = Some(empty_extraction_answer(&results));
            return Ok(response);
        }

        let prompt = build_prompt(&response.extracted, question);
        let answer = self.generate(generator.as_ref(), prompt).await?;
        info!(answer_chars = answer.chars().count(), "Answer generated");
        response.answer = Some(answer);
        Ok(response)
    }

    async fn generate(&self, generator: &dyn LlmProvider, prompt: String) -> Result<String, LlmError> {
        let call = generator.complete(
            vec![Message::user(prompt)],
            self.settings.temperature,
            self.settings.max_tokens,
        );
        match tokio::time::timeout(self.settings.llm_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.settings.llm_timeout.as_secs())),
        }
    }
}
