use std::sync::Arc;

use docask_core::Config;
use docask_ingest::AskEngine;
use docask_llm::LlmProvider;

pub struct AppState {
    pub config: Config,
    pub engine: AskEngine,
}

impl AppState {
    pub fn new(config: Config, engine: AskEngine) -> Self {
        Self { config, engine }
    }

    /// Text-generation backend shared by the ask pipeline and the passthrough.
    pub fn generator(&self) -> Option<&Arc<dyn LlmProvider>> {
        self.engine.generator()
    }
}
