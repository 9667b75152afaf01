//! CLI entry point - the composition root.
//!
//! Loads configuration, builds the shared [`serving_http::AppContext`], and runs the
//! WebSocket/HTTP server until interrupted.

use clap::Parser;

use serving_core::Settings;
use serving_http::bootstrap;

/// ASR/TTS serving core.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Overrides the `HOST` environment variable.
    #[arg(long)]
    host: Option<String>,

    /// Overrides the `PORT` environment variable.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut settings = Settings::from_env();
    if let Some(host) = cli.host {
        settings.host = host;
    }
    if let Some(port) = cli.port {
        settings.port = port;
    }

    let ctx = bootstrap::bootstrap(settings).await?;

    tokio::select! {
        result = bootstrap::start_server(ctx) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
            Ok(())
        }
    }
}
