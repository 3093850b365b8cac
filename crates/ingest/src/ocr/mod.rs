//! Best-effort OCR for image uploads.
//!
//! Engines are tried in order; the first one that returns non-blank text
//! wins. Engine failures, timeouts and blank results all fall through to the
//! next engine, and an exhausted chain yields an empty string.

mod ocr_space;
mod tesseract;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info, warn};

use docask_core::config::OcrConfig;

pub use ocr_space::OcrSpaceEngine;
pub use tesseract::TesseractEngine;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("OCR API error: {0}")]
    Api(String),
    #[error("failed to parse OCR response: {0}")]
    Parse(String),
    #[error("OCR process failed: {0}")]
    Process(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One OCR strategy in the fallback chain.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short name for logs and capability reporting.
    fn name(&self) -> &'static str;

    async fn recognize(&self, image: Bytes, filename: &str) -> Result<String, OcrError>;
}

/// Ordered OCR strategies with a per-engine time limit.
#[derive(Clone)]
pub struct OcrChain {
    engines: Vec<Arc<dyn OcrEngine>>,
    timeout: Duration,
}

impl OcrChain {
    pub fn new(engines: Vec<Arc<dyn OcrEngine>>, timeout: Duration) -> Self {
        Self { engines, timeout }
    }

    /// Remote OCR.Space first when a key is configured, then local tesseract
    /// unless disabled.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let mut engines: Vec<Arc<dyn OcrEngine>> = Vec::new();
        if let Some(api_key) = &config.ocr_space_api_key {
            engines.push(Arc::new(OcrSpaceEngine::new(
                api_key.clone(),
                config.ocr_space_url.clone(),
                config.language.clone(),
                config.timeout(),
            )?));
        }
        if config.tesseract_enabled {
            engines.push(Arc::new(TesseractEngine::new(
                config.tesseract_bin.clone(),
                config.language.clone(),
            )));
        }
        Ok(Self::new(engines, config.timeout()))
    }

    pub fn engine_names(&self) -> Vec<&'static str> {
        self.engines.iter().map(|e| e.name()).collect()
    }

    /// Run the chain. Never fails; an empty string means no engine found text.
    pub async fn recognize(&self, image: &Bytes, filename: &str) -> String {
        for engine in &self.engines {
            let attempt = tokio::time::timeout(self.timeout, engine.recognize(image.clone(), filename));
            match attempt.await {
                Ok(Ok(text)) if !text.trim().is_empty() => {
                    info!(engine = engine.name(), file = %filename, chars = text.chars().count(), "OCR succeeded");
                    return text;
                }
                Ok(Ok(_)) => {
                    debug!(engine = engine.name(), file = %filename, "OCR returned no text, falling back");
                }
                Ok(Err(e)) => {
                    warn!(engine = engine.name(), file = %filename, error = %e, "OCR failed, falling back");
                }
                Err(_) => {
                    warn!(
                        engine = engine.name(),
                        file = %filename,
                        "OCR timed out after {}s, falling back",
                        self.timeout.as_secs()
                    );
                }
            }
        }
        debug!(file = %filename, "OCR chain exhausted without text");
        String::new()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{Behavior, FakeEngine};
    use super::*;

    fn chain(engines: Vec<Arc<FakeEngine>>) -> OcrChain {
        let engines = engines
            .into_iter()
            .map(|e| e as Arc<dyn OcrEngine>)
            .collect();
        OcrChain::new(engines, Duration::from_millis(200))
    }

    fn image() -> Bytes {
        Bytes::from_static(b"\x89PNG fake")
    }

    #[tokio::test]
    async fn remote_failure_falls_back_to_local() {
        let remote = FakeEngine::new(Behavior::Fail);
        let local = FakeEngine::new(Behavior::Text("hello"));
        let text = chain(vec![remote.clone(), local.clone()])
            .recognize(&image(), "scan.png")
            .await;
        assert_eq!(text, "hello");
        assert_eq!(remote.calls(), 1);
        assert_eq!(local.calls(), 1);
    }

    #[tokio::test]
    async fn first_success_stops_the_chain() {
        let remote = FakeEngine::new(Behavior::Text("from remote"));
        let local = FakeEngine::new(Behavior::Text("from local"));
        let text = chain(vec![remote.clone(), local.clone()])
            .recognize(&image(), "scan.png")
            .await;
        assert_eq!(text, "from remote");
        assert_eq!(local.calls(), 0);
    }

    #[tokio::test]
    async fn whitespace_only_counts_as_empty() {
        let remote = FakeEngine::new(Behavior::Text("  \n\t "));
        let local = FakeEngine::new(Behavior::Text("real text"));
        let text = chain(vec![remote, local]).recognize(&image(), "scan.png").await;
        assert_eq!(text, "real text");
    }

    #[tokio::test]
    async fn all_empty_yields_empty_string() {
        let remote = FakeEngine::new(Behavior::Text(""));
        let local = FakeEngine::new(Behavior::Text(""));
        let text = chain(vec![remote, local]).recognize(&image(), "scan.png").await;
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn all_failing_yields_empty_string() {
        let text = chain(vec![FakeEngine::new(Behavior::Fail), FakeEngine::new(Behavior::Fail)])
            .recognize(&image(), "scan.png")
            .await;
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn hung_engine_is_abandoned() {
        let slow = FakeEngine::new(Behavior::Hang);
        let local = FakeEngine::new(Behavior::Text("hello"));
        let text = chain(vec![slow, local]).recognize(&image(), "scan.png").await;
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn no_engines_yields_empty_string() {
        let text = OcrChain::new(Vec::new(), Duration::from_secs(1))
            .recognize(&image(), "scan.png")
            .await;
        assert_eq!(text, "");
    }

    #[test]
    fn config_without_key_skips_remote() {
        let config = OcrConfig::default();
        let chain = OcrChain::from_config(&config).unwrap();
        assert_eq!(chain.engine_names(), vec!["tesseract"]);
    }

    #[test]
    fn config_with_key_puts_remote_first() {
        let config = OcrConfig {
            ocr_space_api_key: Some("K123".into()),
            ..OcrConfig::default()
        };
        let chain = OcrChain::from_config(&config).unwrap();
        assert_eq!(chain.engine_names(), vec!["ocr.space", "tesseract"]);
    }

    #[test]
    fn local_engine_can_be_disabled() {
        let config = OcrConfig {
            tesseract_enabled: false,
            ..OcrConfig::default()
        };
        assert!(OcrChain::from_config(&config).unwrap().engine_names().is_empty());
    }
}
