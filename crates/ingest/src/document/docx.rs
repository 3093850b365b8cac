use quick_xml::events::Event;
use quick_xml::Reader;

use super::ooxml::{open_archive, read_entry, xml_error};
use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Raw text of a `.docx` body: one line per paragraph, tabs and manual
/// breaks kept, all formatting dropped.
pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    if bytes.is_empty() {
        return Err(ExtractionError::EmptyInput);
    }
    let mut archive = open_archive(bytes, "DOCX")?;
    let xml = read_entry(&mut archive, DOCUMENT_PART)?.ok_or_else(|| {
        ExtractionError::ExtractionFailed(format!("{DOCUMENT_PART} not found"))
    })?;
    paragraphs_text(&xml)
}

fn paragraphs_text(xml: &[u8]) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = true;
                }
            }
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| xml_error(DOCUMENT_PART, e))?;
                out.push_str(&text);
            }
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                // <w:p/> is an empty paragraph
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(DOCUMENT_PART, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(out.trim_end_matches('\n').to_string())
}
