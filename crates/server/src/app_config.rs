//! Application configuration builders.
//!
//! Constructs the extraction and text-generation subsystems from `Config`.

use tracing::info;

use docask_core::Config;
use docask_ingest::AskEngine;

use crate::state::AppState;

/// Load configuration from `.env` and environment variables.
pub fn load_config() -> Config {
    docask_core::config::load_dotenv();
    Config::from_env()
}

/// Build shared state: OCR chain, parsers and the optional Gemini provider.
pub fn build_state(config: Config) -> anyhow::Result<AppState> {
    let engine = AskEngine::from_config(&config)?;
    info!(
        ocr_engines = ?engine.extractor().ocr().engine_names(),
        text_generation = engine.can_answer(),
        "Ask engine ready"
    );
    Ok(AppState::new(config, engine))
}
