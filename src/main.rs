//! Mempool sweeper.
//!
//! # Architecture Overview
//!
//! ```text
//!   config.json ──▶ config ──┐
//!                            ├──▶ supervisor ──┬──▶ Chain(endpoint 1) ──▶ monitor ──┐
//!  accounts.txt ──▶ registry ┘                 ├──▶ Chain(endpoint 2) ──▶ monitor ──┤
//!                                              └──▶ ...                             │
//!                                                                                   ▼
//!        node pending feed ──▶ fetch ──▶ recover ──▶ match ──▶ plan ──▶ sign ──▶ broadcast
//! ```
//!
//! Runs until every monitor's subscription has failed.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use mempool_sweeper::blockchain::AccountRegistry;
use mempool_sweeper::config::{self, ConfigError};
use mempool_sweeper::observability::{logging, metrics};
use mempool_sweeper::sweeper;

#[derive(Parser)]
#[command(name = "mempool-sweeper")]
#[command(about = "Race pending transactions from controlled keys to a receiver", long_about = None)]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Path to the private key file, one hex key per line.
    #[arg(short, long, default_value = "accounts.txt")]
    accounts: PathBuf,

    /// Log filter directive, overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref());

    tracing::info!("mempool-sweeper v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match config::load_or_init(&cli.config) {
        Ok(config) => config,
        Err(e @ ConfigError::TemplateCreated(_)) => {
            tracing::warn!("{}", e);
            return Err(e.into());
        }
        Err(e) => {
            tracing::error!(path = %cli.config.display(), error = %e, "Couldn't load config");
            return Err(e.into());
        }
    };

    tracing::info!(
        receiver = %config.receiver,
        endpoints = config.endpoints.len(),
        rpc_timeout_secs = config.rpc_timeout_secs(),
        "Configuration loaded"
    );

    tracing::info!("Loading accounts...");
    let accounts = match AccountRegistry::load(&cli.accounts) {
        Ok(accounts) => Arc::new(accounts),
        Err(e) => {
            tracing::error!(error = %e, "Couldn't load accounts");
            return Err(e.into());
        }
    };

    if accounts.is_empty() {
        tracing::warn!(path = %cli.accounts.display(), "No accounts loaded, nothing will be raced");
    }

    if let Some(addr) = config.metrics_socket_addr() {
        metrics::init_metrics(addr);
    }

    let exits = sweeper::run(&config, accounts).await;

    tracing::info!(stopped = exits.len(), "All pending scanners stopped");
    Ok(())
}
