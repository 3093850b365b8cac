use std::fmt;

use docask_core::extension_of;

/// Logical content type of an upload, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Document(DocumentFormat),
    Spreadsheet,
    Image,
    Text,
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Document(_) => write!(f, "document"),
            ContentKind::Spreadsheet => write!(f, "spreadsheet"),
            ContentKind::Image => write!(f, "image"),
            ContentKind::Text => write!(f, "text"),
            ContentKind::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Classify a file by name. Total: unknown or missing extensions are `Unsupported`.
pub fn classify(filename: &str) -> ContentKind {
    classify_extension(&extension_of(filename))
}

/// Classify an already-lowercased extension (no leading dot).
pub fn classify_extension(ext: &str) -> ContentKind {
    match ext {
        "pdf" => ContentKind::Document(DocumentFormat::Pdf),
        "docx" => ContentKind::Document(DocumentFormat::Docx),
        "xlsx" => ContentKind::Spreadsheet,
        "txt" | "html" => ContentKind::Text,
        "jpg" | "jpeg" | "png" | "webp" | "tif" | "tiff" | "bmp" => ContentKind::Image,
        _ => ContentKind::Unsupported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_table() {
        assert_eq!(classify("a.pdf"), ContentKind::Document(DocumentFormat::Pdf));
        assert_eq!(classify("a.docx"), ContentKind::Document(DocumentFormat::Docx));
        assert_eq!(classify("a.xlsx"), ContentKind::Spreadsheet);
        assert_eq!(classify("a.txt"), ContentKind::Text);
        assert_eq!(classify("a.html"), ContentKind::Text);
        for ext in ["jpg", "jpeg", "png", "webp", "tif", "tiff", "bmp"] {
            assert_eq!(classify(&format!("photo.{ext}")), ContentKind::Image, "{ext}");
        }
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(classify("REPORT.PDF"), ContentKind::Document(DocumentFormat::Pdf));
        assert_eq!(classify("Photo.PnG"), ContentKind::Image);
    }

    #[test]
    fn unknown_and_missing_extensions() {
        assert_eq!(classify("archive.zip"), ContentKind::Unsupported);
        assert_eq!(classify("legacy.doc"), ContentKind::Unsupported);
        assert_eq!(classify("Makefile"), ContentKind::Unsupported);
        assert_eq!(classify(""), ContentKind::Unsupported);
    }

    #[test]
    fn display_tags() {
        assert_eq!(ContentKind::Document(DocumentFormat::Docx).to_string(), "document");
        assert_eq!(ContentKind::Unsupported.to_string(), "unsupported");
    }
}
