//! Startup orchestration.
//!
//! # Responsibilities
//! - Launch the analyzer and wrap its pipes in a gateway
//! - Start the metrics exporter when enabled
//! - Bind the listener and serve until shutdown
//! - Tear the analyzer down after the server stops
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when the analyzer is up)

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::analyzer::{AnalyzerProcess, LaunchError};
use crate::config::GatewayConfig;
use crate::gateway::Gateway;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Errors that stop the service.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP server failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the whole service until `shutdown` fires.
pub async fn run(config: GatewayConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    let (process, channel) = AnalyzerProcess::spawn(&config.analyzer)?;
    let gateway = Arc::new(Gateway::new(channel, &config.timeouts));

    tracing::info!(
        exchange_timeout_ms = config.timeouts.exchange_ms,
        queue_timeout_ms = ?config.timeouts.queue_ms,
        grace_ms = ?config.timeouts.grace_ms,
        "Gateway ready"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse::<SocketAddr>() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let server = HttpServer::new(config.listener, gateway);
    let served = server.run(listener, shutdown.subscribe()).await;

    process.shutdown().await;
    served.map_err(StartupError::Serve)
}
