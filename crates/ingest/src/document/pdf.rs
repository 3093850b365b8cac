use tracing::{debug, warn};

use super::ExtractionError;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Name of the text-layer parser, reported by the server's capability probe.
pub const PDF_BACKEND: &str = "pdf-extract";

/// Returned in place of text when a PDF parses but carries no text layer.
/// Scanned, encrypted and genuinely blank PDFs all land here.
pub const SCANNED_PDF_NOTICE: &str = "This appears to be a scanned PDF or image-based PDF. \
No text could be extracted automatically.";

pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    extract_pdf_with(bytes, |b| {
        pdf_extract::extract_text_from_mem(b).map_err(|e| e.to_string())
    })
}

/// Header check, parse, and page cleanup around an arbitrary PDF text parser.
fn extract_pdf_with<F>(bytes: &[u8], parse: F) -> Result<String, ExtractionError>
where
    F: FnOnce(&[u8]) -> Result<String, String>,
{
    if bytes.is_empty() {
        return Err(ExtractionError::EmptyInput);
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ExtractionError::InvalidFormat(
            "File does not appear to be a valid PDF (missing %PDF header)".to_string(),
        ));
    }

    debug!("Parsing PDF ({} bytes)", bytes.len());
    let text = parse(bytes)
        .map_err(|e| ExtractionError::ExtractionFailed(format!("PDF parsing failed: {e}")))?;

    if text.trim().is_empty() {
        warn!("PDF parsed but no text found (scanned or image-only PDF?)");
        return Ok(SCANNED_PDF_NOTICE.to_string());
    }

    // pdf-extract separates pages with form feeds.
    let pages: Vec<&str> = text
        .split('\x0C')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .collect();
    debug!("PDF yielded {} non-empty pages", pages.len());

    Ok(pages.join("\n\n"))
}
