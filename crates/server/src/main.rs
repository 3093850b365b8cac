use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use docask_core::Config;
use docask_server::app_config::{build_state, load_config};
use docask_server::build_router;

// ── CLI ─────────────────────────────────────────────────────────────

/// docask HTTP server: upload documents and ask questions about them.
#[derive(Parser, Debug)]
#[command(name = "docask-server", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default).
    Serve {
        /// Config profile to use instead of DOCASK_PROFILE.
        #[arg(long)]
        profile: Option<String>,
    },
    /// List config profiles discovered in the environment.
    Profiles,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = load_config();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve { profile: None }) {
        Command::Serve { profile: Some(profile) } => serve(Config::for_profile(&profile)).await,
        Command::Serve { profile: None } => serve(config).await,
        Command::Profiles => {
            for profile in Config::available_profiles() {
                println!("{profile}");
            }
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    config.log_summary();
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let port = config.server.port;

    let state = Arc::new(build_state(config)?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://localhost:{}", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
