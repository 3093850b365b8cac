mod docx;
mod kind;
mod ooxml;
mod pdf;
mod txt;
mod xlsx;

use thiserror::Error;

pub use docx::extract_docx;
pub use kind::{classify, classify_extension, ContentKind, DocumentFormat};
pub use pdf::{extract_pdf, PDF_BACKEND, SCANNED_PDF_NOTICE};
pub use txt::extract_txt;
pub use xlsx::extract_xlsx;

/// Why a single file produced no text. Recorded on that file's result and
/// never allowed to abort the rest of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Empty or invalid buffer")]
    EmptyInput,
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),
}
