//! Per-file extraction: classify, dispatch to the matching extractor, and
//! turn every outcome into an [`ExtractionResult`].

use std::time::Duration;

use bytes::Bytes;
use tracing::{info, warn};

use docask_core::{Config, FileSummary, UploadedFile};

use crate::document::{
    classify_extension, extract_docx, extract_pdf, extract_txt, extract_xlsx, ContentKind,
    DocumentFormat, ExtractionError,
};
use crate::ocr::{OcrChain, OcrError};

/// Outcome for one uploaded file. An error always means empty text.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub name: String,
    pub extension: String,
    pub size: usize,
    pub kind: ContentKind,
    pub outcome: Result<String, ExtractionError>,
}

impl ExtractionResult {
    pub fn text(&self) -> &str {
        self.outcome.as_deref().unwrap_or("")
    }

    pub fn error(&self) -> Option<String> {
        self.outcome.as_ref().err().map(|e| e.to_string())
    }

    /// Whether this file contributes to the context blob.
    pub fn has_text(&self) -> bool {
        !self.text().trim().is_empty()
    }

    pub fn summary(&self) -> FileSummary {
        FileSummary {
            name: self.name.clone(),
            file_type: self.extension.clone(),
            size: self.size,
            text_length: self.text().chars().count(),
            error: self.error(),
        }
    }
}

#[derive(Clone)]
pub struct Extractor {
    ocr: OcrChain,
    parse_timeout: Duration,
}

impl Extractor {
    pub fn new(ocr: OcrChain, parse_timeout: Duration) -> Self {
        Self { ocr, parse_timeout }
    }

    pub fn from_config(config: &Config) -> Result<Self, OcrError> {
        Ok(Self::new(
            OcrChain::from_config(&config.ocr)?,
            config.extract.parse_timeout(),
        ))
    }

    pub fn ocr(&self) -> &OcrChain {
        &self.ocr
    }

    /// Extract one file. Never fails: problems are recorded on the result.
    pub async fn extract(&self, file: &UploadedFile) -> ExtractionResult {
        let kind = classify_extension(&file.extension);
        let outcome = self.extract_kind(kind, file).await;

        match &outcome {
            Ok(text) => info!(
                file = %file.name,
                kind = %kind,
                bytes = file.size(),
                chars = text.chars().count(),
                "extracted"
            ),
            Err(e) => warn!(file = %file.name, kind = %kind, error = %e, "extraction failed"),
        }

        ExtractionResult {
            name: file.name.clone(),
            extension: file.extension.clone(),
            size: file.size(),
            kind,
            outcome,
        }
    }

    async fn extract_kind(
        &self,
        kind: ContentKind,
        file: &UploadedFile,
    ) -> Result<String, ExtractionError> {
        if file.bytes.is_empty() && kind != ContentKind::Unsupported {
            return Err(ExtractionError::EmptyInput);
        }

        match kind {
            ContentKind::Text => extract_txt(&file.bytes),
            ContentKind::Document(DocumentFormat::Pdf) => {
                self.parse_blocking(file.bytes.clone(), "PDF", extract_pdf).await
            }
            ContentKind::Document(DocumentFormat::Docx) => {
                self.parse_blocking(file.bytes.clone(), "DOCX", extract_docx).await
            }
            ContentKind::Spreadsheet => {
                self.parse_blocking(file.bytes.clone(), "XLSX", extract_xlsx).await
            }
            ContentKind::Image => Ok(self.ocr.recognize(&file.bytes, &file.name).await),
            ContentKind::Unsupported => Ok(String::new()),
        }
    }

    /// Run a CPU-bound parser off the async runtime under the parse timeout.
    /// A parser that panics or overruns fails only its own file. An overrun
    /// parser thread is left to finish in the background.
    async fn parse_blocking<F>(
        &self,
        bytes: Bytes,
        format: &'static str,
        parse: F,
    ) -> Result<String, ExtractionError>
    where
        F: FnOnce(&[u8]) -> Result<String, ExtractionError> + Send + 'static,
    {
        let task = tokio::task::spawn_blocking(move || parse(&bytes));
        match tokio::time::timeout(self.parse_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) if join_err.is_panic() => Err(ExtractionError::ExtractionFailed(
                format!("{format} parser crashed on this file"),
            )),
            Ok(Err(join_err)) => Err(ExtractionError::ExtractionFailed(join_err.to_string())),
            Err(_) => Err(ExtractionError::ExtractionFailed(format!(
                "{format} parsing timed out after {}s",
                self.parse_timeout.as_secs_f32()
            ))),
        }
    }
}
