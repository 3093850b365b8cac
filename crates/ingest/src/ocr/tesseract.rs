use std::process::Stdio;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::{OcrEngine, OcrError};

/// Local OCR by piping the image through the `tesseract` CLI.
pub struct TesseractEngine {
    bin: String,
    language: String,
}

impl TesseractEngine {
    pub fn new(bin: String, language: String) -> Self {
        Self { bin, language }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn recognize(&self, image: Bytes, filename: &str) -> Result<String, OcrError> {
        debug!("tesseract on {} ({} bytes)", filename, image.len());

        let mut child = Command::new(&self.bin)
            .args(["stdin", "stdout", "-l", self.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // the chain's timeout drops this future; take the process with it
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| OcrError::Process("stdin not captured".to_string()))?;
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&image).await;
            drop(stdin);
            result
        });

        let output = child.wait_with_output().await?;
        // A write error here just means tesseract exited early; its status says why.
        let _ = writer.await;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Process(format!(
                "{} exited with {}: {}",
                self.bin,
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_io_error() {
        let engine = TesseractEngine::new("docask-no-such-tesseract".into(), "eng".into());
        let err = engine
            .recognize(Bytes::from_static(b"img"), "a.png")
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::Io(_)));
    }
}
