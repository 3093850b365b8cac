pub mod gemini;

use std::sync::Arc;

use docask_core::config::LlmConfig;

use crate::provider::{LlmError, LlmProvider};

/// Create the text-generation provider from config.
///
/// Returns `Ok(None)` when no API key is configured; callers treat that as
/// "answering disabled" rather than an error.
pub fn create_provider(llm_config: &LlmConfig) -> Result<Option<Arc<dyn LlmProvider>>, LlmError> {
    let Some(api_key) = llm_config.gemini_api_key.as_ref() else {
        return Ok(None);
    };
    let provider = gemini::GeminiProvider::new(
        api_key.clone(),
        llm_config.gemini_model.clone(),
        llm_config.gemini_base_url.clone(),
        llm_config.timeout(),
    )?;
    Ok(Some(Arc::new(provider)))
}
