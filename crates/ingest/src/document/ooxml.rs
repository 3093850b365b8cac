//! Shared plumbing for the zip + XML based Office formats (DOCX, XLSX).

use std::io::{Cursor, Read};

use quick_xml::events::BytesStart;
use zip::result::ZipError;
use zip::ZipArchive;

use super::ExtractionError;

/// Maximum decompressed bytes read from a single archive entry (zip-bomb guard).
const MAX_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

pub(super) type Archive<'a> = ZipArchive<Cursor<&'a [u8]>>;

pub(super) fn open_archive<'a>(bytes: &'a [u8], format: &str) -> Result<Archive<'a>, ExtractionError> {
    ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
        ExtractionError::ExtractionFailed(format!("not a valid {format} archive: {e}"))
    })
}

/// Read one archive entry, `Ok(None)` when it does not exist.
pub(super) fn read_entry(
    archive: &mut Archive<'_>,
    name: &str,
) -> Result<Option<Vec<u8>>, ExtractionError> {
    let entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => {
            return Err(ExtractionError::ExtractionFailed(format!("{name}: {e}")));
        }
    };
    let mut out = Vec::new();
    entry
        .take(MAX_ENTRY_BYTES)
        .read_to_end(&mut out)
        .map_err(|e| ExtractionError::ExtractionFailed(format!("{name}: {e}")))?;
    if out.len() as u64 >= MAX_ENTRY_BYTES {
        return Err(ExtractionError::ExtractionFailed(format!(
            "{name} exceeds size limit ({MAX_ENTRY_BYTES} bytes)"
        )));
    }
    Ok(Some(out))
}

/// Value of the attribute whose local name (namespace prefix ignored) is `local`.
pub(super) fn attr(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

pub(super) fn xml_error(part: &str, e: quick_xml::Error) -> ExtractionError {
    ExtractionError::ExtractionFailed(format!("malformed XML in {part}: {e}"))
}
