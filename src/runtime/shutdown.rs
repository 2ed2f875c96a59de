//! Shutdown signal handling (SIGINT, and SIGTERM on unix).

use crate::controller::server::ServerState;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Resolve when the process receives SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

/// Mark the server not ready and cancel `cancel` on the first shutdown signal
///
/// Returns immediately if `cancel` fires first.
pub fn spawn_shutdown_handler(
    cancel: CancellationToken,
    state: Arc<ServerState>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            () = shutdown_signal() => {
                info!("Received shutdown signal, initiating graceful shutdown");
                state.set_ready(false);
                cancel.cancel();
            }
            () = cancel.cancelled() => {}
        }
    })
}
