//! mystem gateway
//!
//! Exposes a single long-running mystem process as a concurrent HTTP service.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                  MYSTEM GATEWAY                  │
//!                        │                                                  │
//!   POST /mystem text=…  │  ┌────────┐    ┌─────────┐    ┌──────────────┐   │
//!   ─────────────────────┼─▶│  http  │───▶│ gateway │───▶│ request gate │   │
//!                        │  │handler │    │         │    │  (one slot)  │   │
//!                        │  └────────┘    └─────────┘    └──────┬───────┘   │
//!                        │                                      │           │
//!                        │                                      ▼           │
//!                        │                              ┌──────────────┐    │  stdin
//!   200 application/json │  ┌────────┐                  │timeout guard │────┼──────▶ mystem
//!   ◀────────────────────┼──│response│◀─────────────────│+ pipe channel│◀───┼─────── -i --format=json
//!                        │  └────────┘                  └──────────────┘    │  stdout
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use mystem_gateway::config::load_config;
use mystem_gateway::lifecycle::{signals, startup, Shutdown};
use mystem_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "mystem-gateway")]
#[command(about = "HTTP gateway for the mystem morphological analyzer", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref(), |key| std::env::var(key).ok())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);

    tracing::info!("mystem-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        path = %config.listener.path,
        analyzer = %config.analyzer.binary,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    startup::run(config, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
