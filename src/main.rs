mod adapters;
mod config;
mod core;
mod persist;
mod protocol;

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use crate::core::{Lexicon, MintCore};
use config::{Cli, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_new(&cli.log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .init();

    let config = Config::from_cli(&cli);

    startup_diagnostics(&config);

    // Word list: operator-supplied file, or the embedded one
    let lexicon = match &config.words_path {
        Some(path) => {
            let lex = Lexicon::from_file(path)?;
            tracing::info!(words = lex.len(), path = %path.display(), "Word list loaded");
            lex
        }
        None => {
            let lex = Lexicon::embedded();
            tracing::info!(words = lex.len(), "Embedded word list loaded");
            lex
        }
    };

    // A corrupt ledger snapshot aborts startup here — proceeding with an
    // empty ledger would reissue old codes.
    let core = Arc::new(MintCore::load(config.ledger_path.clone(), Box::new(lexicon))?);

    let cancel = CancellationToken::new();
    core.spawn_flusher(cancel.clone());

    // HTTP adapter
    let http_core = core.clone();
    let bind = config.bind;
    let port = config.http_port;
    let mut tasks = Vec::new();
    tasks.push(tokio::spawn(async move {
        if let Err(e) = adapters::http::start(http_core, bind, port).await {
            tracing::error!(error = %e, "HTTP adapter failed");
        }
    }));

    tracing::info!("Ready.");

    // Wait for shutdown signal
    shutdown_signal().await;
    tracing::info!("Shutting down...");

    // Graceful shutdown: stop the flusher, then write the final snapshot
    cancel.cancel();
    if let Err(e) = core.shutdown() {
        tracing::warn!(error = %e, "Error during shutdown");
    }

    Ok(())
}

/// Wait for Ctrl+C or platform-specific shutdown signal.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for Ctrl+C");
}

/// Print startup diagnostics.
fn startup_diagnostics(config: &Config) {
    tracing::info!("hexmint v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("Platform: {}", std::env::consts::OS);

    match hostname::get() {
        Ok(h) => tracing::info!("Hostname: {}", h.to_string_lossy()),
        Err(e) => tracing::warn!(error = %e, "Could not determine hostname"),
    }

    tracing::info!("TCP {}:{}: listening (HTTP adapter)", config.bind, config.http_port);
    tracing::info!("Ledger snapshot: {}", config.ledger_path.display());
}
