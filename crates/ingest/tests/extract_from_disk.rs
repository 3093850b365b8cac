//! Runs the ask pipeline over real files written to a temp directory, the
//! way `docask-extract` does.

use std::io::{Cursor, Write};
use std::path::Path;
use std::time::Duration;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use docask_core::UploadedFile;
use docask_ingest::ocr::OcrChain;
use docask_ingest::{AskEngine, AskSettings, Extractor};

fn zip_of(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, body) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn engine() -> AskEngine {
    let extractor = Extractor::new(
        OcrChain::new(Vec::new(), Duration::from_secs(1)),
        Duration::from_secs(10),
    );
    AskEngine::new(
        extractor,
        None,
        AskSettings {
            context_char_cap: 20_000,
            temperature: 0.2,
            max_tokens: 256,
            llm_timeout: Duration::from_secs(5),
        },
    )
}

async fn load(path: &Path) -> UploadedFile {
    let bytes = tokio::fs::read(path).await.unwrap();
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    UploadedFile::new(name, bytes)
}

#[tokio::test]
async fn office_and_text_files_from_disk() {
    let dir = tempfile::tempdir().unwrap();

    let docx = zip_of(&[(
        "word/document.xml",
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Quarterly report</w:t></w:r></w:p><w:p><w:r><w:t>Revenue grew.</w:t></w:r></w:p></w:body></w:document>"#,
    )]);
    let xlsx = zip_of(&[(
        "xl/worksheets/sheet1.xml",
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>region</t></is></c><c r="B1" t="inlineStr"><is><t>sales</t></is></c></row><row r="2"><c r="A2" t="inlineStr"><is><t>north</t></is></c><c r="B2"><v>12</v></c></row></sheetData></worksheet>"#,
    )]);

    std::fs::write(dir.path().join("Report.DOCX"), docx).unwrap();
    std::fs::write(dir.path().join("sales.xlsx"), xlsx).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "# Notes\nship it").unwrap();
    std::fs::write(dir.path().join("archive.tar"), [0u8; 16]).unwrap();

    let mut files = Vec::new();
    for name in ["Report.DOCX", "sales.xlsx", "notes.txt", "archive.tar"] {
        files.push(load(&dir.path().join(name)).await);
    }

    let resp = engine().ask(files, "How did revenue do?").await.unwrap();

    assert_eq!(
        resp.extracted,
        "--- Report.DOCX (docx) ---\nQuarterly report\nRevenue grew.\n\n\
         --- sales.xlsx (xlsx) ---\nregion,sales\nnorth,12\n\n\
         --- notes.txt (txt) ---\n# Notes\nship it"
    );
    assert!(resp.answer.is_none());
    let types: Vec<_> = resp.files.iter().map(|f| f.file_type.as_str()).collect();
    assert_eq!(types, ["docx", "xlsx", "txt", "tar"]);
    assert!(resp.files.iter().all(|f| f.error.is_none()));
    assert_eq!(resp.files[3].text_length, 0);
}

#[tokio::test]
async fn corrupt_office_file_fails_alone() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.docx"), b"PK not really a zip").unwrap();
    std::fs::write(dir.path().join("ok.txt"), "still here").unwrap();

    let files = vec![
        load(&dir.path().join("broken.docx")).await,
        load(&dir.path().join("ok.txt")).await,
    ];
    let resp = engine().ask(files, "").await.unwrap();

    assert!(resp.files[0]
        .error
        .as_deref()
        .unwrap()
        .starts_with("Extraction failed"));
    assert_eq!(resp.extracted, "--- ok.txt (txt) ---\nstill here");
}
