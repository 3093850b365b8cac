//! docask-extract: run the ask pipeline over files on disk and print the
//! JSON response.
//!
//! Uses the same profiled environment as the server, so OCR and Gemini
//! settings come from `.env` unless `--no-llm` is given.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use docask_core::{Config, UploadedFile};
use docask_ingest::AskEngine;

// ── CLI ─────────────────────────────────────────────────────────────

/// Extract text from documents and optionally ask a question about them.
#[derive(Parser, Debug)]
#[command(name = "docask-extract", version, about)]
struct Cli {
    /// Files to extract (pdf, docx, xlsx, images, plain text).
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Question to answer against the extracted text.
    #[arg(short, long, default_value = "")]
    question: String,

    /// Skip text generation even if an API key is configured.
    #[arg(long)]
    no_llm: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Config profile (overrides DOCASK_PROFILE).
    #[arg(long, env = "DOCASK_PROFILE")]
    profile: Option<String>,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the JSON result, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    docask_core::config::load_dotenv();
    let cli = Cli::parse();

    let config = match &cli.profile {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };

    let mut engine = AskEngine::from_config(&config)?;
    if cli.no_llm {
        engine = engine.without_generator();
    }

    let mut files = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        files.push(UploadedFile::new(name, bytes));
    }
    info!(files = files.len(), "extracting");

    let response = engine.ask(files, &cli.question).await?;
    let json = if cli.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{json}");

    Ok(())
}
