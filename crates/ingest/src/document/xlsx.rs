use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::ooxml::{attr, open_archive, read_entry, xml_error, Archive};
use super::ExtractionError;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Cells read per sheet before the rest of the sheet is ignored.
const MAX_CELLS_PER_SHEET: usize = 200_000;

/// Grid limits of the format: columns A..=XFD, rows 1..=1048576.
const MAX_COLUMNS: usize = 16_384;
const MAX_ROWS: u32 = 1_048_576;

/// Rendered CSV per sheet stops growing past this many bytes.
const MAX_SHEET_CSV_BYTES: usize = 8 * 1024 * 1024;

/// Every sheet of an `.xlsx` workbook as CSV, in workbook order, separated
/// by a blank line. Cached values are used; formulas are not evaluated.
pub fn extract_xlsx(bytes: &[u8]) -> Result<String, ExtractionError> {
    if bytes.is_empty() {
        return Err(ExtractionError::EmptyInput);
    }
    let mut archive = open_archive(bytes, "XLSX")?;
    let shared = match read_entry(&mut archive, SHARED_STRINGS_PART)? {
        Some(xml) => shared_strings(&xml)?,
        None => Vec::new(),
    };

    let parts = sheet_parts(&mut archive)?;
    if parts.is_empty() {
        return Err(ExtractionError::ExtractionFailed(
            "workbook contains no worksheets".to_string(),
        ));
    }

    let mut sheets = Vec::with_capacity(parts.len());
    for part in parts {
        let xml = read_entry(&mut archive, &part)?.ok_or_else(|| {
            ExtractionError::ExtractionFailed(format!("worksheet {part} not found"))
        })?;
        let rows = sheet_rows(&xml, &part, &shared)?;
        sheets.push(rows_to_csv(&rows, &part));
    }
    Ok(sheets.join("\n\n"))
}

// ── Workbook structure ────────────────────────────────────────

/// Worksheet part names in workbook (tab) order.
fn sheet_parts(archive: &mut Archive<'_>) -> Result<Vec<String>, ExtractionError> {
    let workbook = read_entry(archive, WORKBOOK_PART)?;
    let rels = read_entry(archive, WORKBOOK_RELS_PART)?;

    if let (Some(workbook), Some(rels)) = (workbook, rels) {
        let targets = relationship_targets(&rels)?;
        let ids = sheet_rel_ids(&workbook)?;
        let parts: Vec<String> = ids
            .iter()
            .filter_map(|id| targets.iter().find(|(rid, _)| rid == id))
            .map(|(_, target)| resolve_target(target))
            .collect();
        if !parts.is_empty() {
            return Ok(parts);
        }
    }

    // No usable workbook metadata: fall back to sheetN.xml numbering.
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("xl/worksheets/sheet") && n.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    names.sort_by_key(|name| {
        name.trim_start_matches("xl/worksheets/sheet")
            .trim_end_matches(".xml")
            .parse::<u32>()
            .unwrap_or(u32::MAX)
    });
    Ok(names)
}

/// `r:id` of every `<sheet>` in xl/workbook.xml, in document order.
fn sheet_rel_ids(xml: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut ids = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sheet" => {
                if let Some(id) = attr(&e, b"id") {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(WORKBOOK_PART, e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(ids)
}

/// (Id, Target) pairs from xl/_rels/workbook.xml.rels.
fn relationship_targets(xml: &[u8]) -> Result<Vec<(String, String)>, ExtractionError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut targets = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                if let (Some(id), Some(target)) = (attr(&e, b"Id"), attr(&e, b"Target")) {
                    targets.push((id, target));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(WORKBOOK_RELS_PART, e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(targets)
}

/// Relationship targets are relative to xl/ unless absolute.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    }
}

/// Shared string table; rich-text runs inside one `<si>` are concatenated.
fn shared_strings(xml: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_t = false;
    // Phonetic runs (<rPh>) repeat the text in another script; skip them.
    let mut in_phonetic = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_t = true,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Ok(Event::Text(t)) if in_t && !in_phonetic => {
                let text = t.unescape().map_err(|e| xml_error(SHARED_STRINGS_PART, e))?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"t" => in_t = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(SHARED_STRINGS_PART, e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

// ── Worksheet cells ───────────────────────────────────────────

/// A populated row: 1-based row number and (0-based column, value) cells.
struct Row {
    number: u32,
    cells: Vec<(usize, String)>,
}

#[derive(Default)]
struct PendingCell {
    column: usize,
    cell_type: Option<String>,
    value: String,
}

fn sheet_rows(xml: &[u8], part: &str, shared: &[String]) -> Result<Vec<Row>, ExtractionError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut rows: Vec<Row> = Vec::new();
    let mut cell: Option<PendingCell> = None;
    let mut in_value = false;
    let mut cell_count = 0usize;

    loop {
        if cell_count >= MAX_CELLS_PER_SHEET {
            tracing::warn!("{part}: cell limit reached, remaining cells ignored");
            break;
        }
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"row" => {
                    let row = start_row(&e, rows.last(), part)?;
                    rows.push(row);
                }
                b"c" => cell = Some(start_cell(&e, rows.last(), part)?),
                // <v> holds the cached value, <t> the inline string text
                b"v" | b"t" if cell.is_some() => in_value = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"row" => {
                    let row = start_row(&e, rows.last(), part)?;
                    rows.push(row);
                }
                b"c" => {
                    // <c/> has no value but still advances the implicit column
                    let pending = start_cell(&e, rows.last(), part)?;
                    if let Some(row) = rows.last_mut() {
                        row.cells.push((pending.column, String::new()));
                    }
                    cell_count += 1;
                }
                _ => {}
            },
            Ok(Event::Text(t)) if in_value => {
                if let Some(pending) = cell.as_mut() {
                    let text = t.unescape().map_err(|e| xml_error(part, e))?;
                    pending.value.push_str(&text);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    if let Some(pending) = cell.take() {
                        let value = cell_value(&pending, shared);
                        if rows.is_empty() {
                            rows.push(Row { number: 1, cells: Vec::new() });
                        }
                        if let Some(row) = rows.last_mut() {
                            row.cells.push((pending.column, value));
                        }
                        cell_count += 1;
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(part, e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(rows)
}

fn start_row(
    e: &BytesStart<'_>,
    previous: Option<&Row>,
    part: &str,
) -> Result<Row, ExtractionError> {
    let number = match attr(e, b"r") {
        Some(r) => r.trim().parse::<u32>().ok(),
        None => None,
    }
    .unwrap_or_else(|| previous.map_or(1, |row| row.number.saturating_add(1)));
    if number == 0 || number > MAX_ROWS {
        return Err(outside_grid(part, &format!("row {number}")));
    }
    Ok(Row { number, cells: Vec::new() })
}

fn start_cell(
    e: &BytesStart<'_>,
    row: Option<&Row>,
    part: &str,
) -> Result<PendingCell, ExtractionError> {
    let next_column = row
        .and_then(|r| r.cells.last())
        .map_or(0, |(column, _)| column + 1);
    let reference = attr(e, b"r");
    let column = reference
        .as_deref()
        .and_then(column_index)
        .unwrap_or(next_column);
    if column >= MAX_COLUMNS {
        let label = reference.unwrap_or_else(|| format!("column {}", column + 1));
        return Err(outside_grid(part, &format!("cell {label}")));
    }
    Ok(PendingCell {
        column,
        cell_type: attr(e, b"t"),
        value: String::new(),
    })
}

fn outside_grid(part: &str, what: &str) -> ExtractionError {
    ExtractionError::ExtractionFailed(format!("{part}: {what} is outside the worksheet grid"))
}

fn cell_value(cell: &PendingCell, shared: &[String]) -> String {
    match cell.cell_type.as_deref() {
        Some("s") => cell
            .value
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|i| shared.get(i).cloned())
            .unwrap_or_default(),
        Some("b") => match cell.value.trim() {
            "1" => "TRUE".to_string(),
            _ => "FALSE".to_string(),
        },
        _ => cell.value.clone(),
    }
}

/// Zero-based column index from an A1-style reference ("C7" -> 2).
/// Saturates instead of overflowing, so oversized references stay oversized.
fn column_index(reference: &str) -> Option<usize> {
    let mut index = 0usize;
    let mut seen = false;
    for b in reference.bytes().take_while(u8::is_ascii_alphabetic) {
        seen = true;
        let digit = (b.to_ascii_uppercase() - b'A' + 1) as usize;
        index = index.saturating_mul(26).saturating_add(digit);
    }
    seen.then(|| index - 1)
}

// ── CSV rendering ─────────────────────────────────────────────

/// Render populated rows as CSV in row order, each padded to the sheet's
/// widest row so columns stay positional. Rows sharing a number are merged.
fn rows_to_csv(rows: &[Row], part: &str) -> String {
    let width = rows
        .iter()
        .flat_map(|r| r.cells.iter().map(|(column, _)| column + 1))
        .max()
        .unwrap_or(0);

    let mut by_number: BTreeMap<u32, Vec<&(usize, String)>> = BTreeMap::new();
    for row in rows.iter().filter(|r| !r.cells.is_empty()) {
        by_number.entry(row.number).or_default().extend(row.cells.iter());
    }

    let mut out = String::new();
    for cells in by_number.values() {
        let mut fields = vec![String::new(); width];
        for (column, value) in cells {
            if let Some(field) = fields.get_mut(*column) {
                *field = csv_field(value);
            }
        }
        let line = fields.join(",");
        if out.len() + line.len() + 1 > MAX_SHEET_CSV_BYTES {
            tracing::warn!("{part}: CSV size limit reached, remaining rows dropped");
            break;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&line);
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
