//! # Runtime
//!
//! Wires configuration, logging, metrics, the HTTP server, the provider and the
//! controller together.
//!
//! - `initialization`: crypto provider, logging and startup banner
//! - `shutdown`: signal handling

pub mod initialization;
pub mod shutdown;

use crate::config::Config;
use crate::controller::server::{self, ServerState};
use crate::controller::Controller;
use crate::observability::Metrics;
use crate::provider::build_provider;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Initialize the process and run until done
///
/// # Errors
/// Returns an error on startup failures, or on a failed sync in one-shot mode.
pub async fn run(config: Config) -> Result<()> {
    initialization::initialize(&config)?;
    execute(&config).await
}

/// Serve metrics and health checks and synchronize the secret
///
/// In one-shot mode a single sync is performed; otherwise syncs repeat until a
/// shutdown signal arrives.
///
/// # Errors
/// Returns an error if the HTTP server cannot bind, the provider cannot be built,
/// or the one-shot sync fails.
pub async fn execute(config: &Config) -> Result<()> {
    let metrics = Metrics::new().context("Failed to initialize metrics")?;
    let state = Arc::new(ServerState::new(metrics.clone()));
    let cancel = CancellationToken::new();

    let listener = TcpListener::bind(config.metrics_address)
        .await
        .with_context(|| format!("Failed to bind HTTP server to {}", config.metrics_address))?;
    let server = tokio::spawn(server::serve(listener, Arc::clone(&state), cancel.clone()));

    let result = synchronize(config, metrics, &state, &cancel).await;

    state.set_ready(false);
    cancel.cancel();
    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "HTTP server failed"),
        Err(e) => error!(error = %e, "HTTP server task panicked"),
    }

    result
}

async fn synchronize(
    config: &Config,
    metrics: Metrics,
    state: &Arc<ServerState>,
    cancel: &CancellationToken,
) -> Result<()> {
    let provider = build_provider(config)
        .await
        .with_context(|| format!("Failed to initialize {} provider", config.provider))?;
    state.set_ready(true);

    let controller = Controller::new(provider, config.secret_name.clone(), config.interval, metrics)
        .with_reveal_secret(config.reveal_secret);

    if config.once {
        info!(secret.name = %config.secret_name, "Running a single synchronization");
        controller
            .run_once()
            .await
            .with_context(|| format!("Failed to synchronize secret '{}'", config.secret_name))?;
        return Ok(());
    }

    let signals = shutdown::spawn_shutdown_handler(cancel.clone(), Arc::clone(state));
    controller.run_until_cancelled(cancel.clone()).await;
    signals.abort();

    info!("Shutdown complete");
    Ok(())
}
