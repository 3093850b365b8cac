use crate::extractor::ExtractionResult;

/// Longest prefix of `text` holding at most `cap` characters.
pub fn truncate_chars(text: &str, cap: usize) -> &str {
    match text.char_indices().nth(cap) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Join every file that yielded text under a `--- name (ext) ---` header,
/// each file's text capped at `cap` characters.
pub fn build_context(results: &[ExtractionResult], cap: usize) -> String {
    results
        .iter()
        .filter(|r| r.has_text())
        .map(|r| {
            format!(
                "--- {} ({}) ---\n{}",
                r.name,
                r.extension,
                truncate_chars(r.text(), cap)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(context: &str, question: &str) -> String {
    let question = match question.trim() {
        "" => "Summarize the key points of these files.",
        q => q,
    };
    format!(
        "You are given the following extracted text from uploaded files:\n{context}\n\n\
         Answer the question succinctly:\n{question}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ContentKind, DocumentFormat, ExtractionError};

    fn ok(name: &str, ext: &str, text: &str) -> ExtractionResult {
        ExtractionResult {
            name: name.into(),
            extension: ext.into(),
            size: text.len(),
            kind: ContentKind::Text,
            outcome: Ok(text.into()),
        }
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn failed_and_blank_files_are_left_out() {
        let results = vec![
            ok("a.txt", "txt", "hello"),
            ExtractionResult {
                name: "b.pdf".into(),
                extension: "pdf".into(),
                size: 4,
                kind: ContentKind::Document(DocumentFormat::Pdf),
                outcome: Err(ExtractionError::InvalidFormat("no header".into())),
            },
            ok("c.txt", "txt", "  \n "),
        ];
        let context = build_context(&results, 100);
        assert_eq!(context, "--- a.txt (txt) ---\nhello");
    }

    #[test]
    fn files_are_joined_by_blank_line() {
        let results = vec![ok("a.txt", "txt", "one"), ok("b.md", "md", "two")];
        assert_eq!(
            build_context(&results, 100),
            "--- a.txt (txt) ---\none\n\n--- b.md (md) ---\ntwo"
        );
    }

    #[test]
    fn each_file_is_capped_separately() {
        let results = vec![ok("a.txt", "txt", &"x".repeat(50)), ok("b.txt", "txt", "short")];
        let context = build_context(&results, 10);
        let first = context.split("\n\n").next().unwrap();
        assert_eq!(first, format!("--- a.txt (txt) ---\n{}", "x".repeat(10)));
        assert!(context.ends_with("short"));
    }

    #[test]
    fn prompt_contains_context_and_question() {
        let prompt = build_prompt("CTX", "Why?");
        assert!(prompt.contains("CTX\n\nAnswer the question succinctly:\nWhy?"));
        assert!(build_prompt("CTX", "  ").ends_with("Summarize the key points of these files."));
    }
}
