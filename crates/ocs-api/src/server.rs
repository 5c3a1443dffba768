//! Server lifecycle
//!
//! The server runs in a background task and stops accepting connections once
//! the shutdown token is cancelled. In-flight requests get a bounded grace
//! period to finish.

use axum::Router;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How long in-flight requests may run after shutdown is requested
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Serve `app` until `shutdown` is cancelled, then drain for at most `grace`
pub async fn run(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
    grace: Duration,
) -> anyhow::Result<()> {
    let token = shutdown.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await
    });

    tokio::select! {
        // Server exited on its own, e.g. an accept error
        result = &mut server => return Ok(result??),
        _ = shutdown.cancelled() => {}
    }

    info!("Stopping HTTP server...");
    match tokio::time::timeout(grace, server).await {
        Ok(result) => {
            result??;
            info!("HTTP server stopped");
        }
        Err(_) => warn!(
            grace_secs = grace.as_secs(),
            "In-flight requests did not finish within the grace period"
        ),
    }

    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
