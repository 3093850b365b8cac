use super::ExtractionError;

/// Decode a `.txt` / `.html` upload as UTF-8. Invalid sequences are replaced
/// rather than rejected; the text is returned untrimmed.
pub fn extract_txt(bytes: &[u8]) -> Result<String, ExtractionError> {
    if bytes.is_empty() {
        return Err(ExtractionError::EmptyInput);
    }
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_simple_text() {
        let text = extract_txt(b"Hello, world!\nThis is a test file.").unwrap();
        assert_eq!(text, "Hello, world!\nThis is a test file.");
    }

    #[test]
    fn extract_utf8_text() {
        let content = "Ünïcödé text with émojis 🎉".as_bytes();
        assert_eq!(extract_txt(content).unwrap(), "Ünïcödé text with émojis 🎉");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let text = extract_txt(&[b'o', b'k', 0xFF]).unwrap();
        assert!(text.starts_with("ok"));
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn empty_buffer_is_error() {
        assert_eq!(extract_txt(b""), Err(ExtractionError::EmptyInput));
    }

    #[test]
    fn whitespace_is_kept() {
        assert_eq!(extract_txt(b"  \n  Hello  \n  ").unwrap(), "  \n  Hello  \n  ");
    }
}
