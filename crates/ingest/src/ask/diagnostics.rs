use crate::extractor::ExtractionResult;

/// `error` field for a batch where nothing could be extracted.
pub fn extraction_error_summary(results: &[ExtractionResult]) -> String {
    let details = results
        .iter()
        .map(|r| {
            format!(
                "{}: {}",
                r.name,
                r.error().unwrap_or_else(|| "Unknown error".to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("; ");
    format!("No text could be extracted from the uploaded files. Details: {details}")
}

/// Answer returned in place of a generated one when every file came up empty.
pub fn empty_extraction_answer(results: &[ExtractionResult]) -> String {
    let lines = results
        .iter()
        .map(|r| {
            let ext = if r.extension.is_empty() { "unknown" } else { &r.extension };
            format!(
                "• {} ({}, {:.1}KB): {}",
                r.name,
                ext,
                r.size as f64 / 1024.0,
                r.error().unwrap_or_else(|| "No text found".to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "I couldn't extract any readable text from the uploaded files. This might be because:\n\
         \n\
         1. **Scanned PDF**: The PDF contains images/scans rather than selectable text\n\
         2. **Encrypted PDF**: The PDF is password protected or encrypted\n\
         3. **Corrupted file**: The file may be damaged\n\
         4. **Unsupported format**: The file format isn't supported for text extraction\n\
         \n\
         File analysis:\n\
         {lines}\n\
         \n\
         For scanned PDFs, you might need to use OCR (Optical Character Recognition) tools to extract the text first."
    )
}
