//! OS signal handling.
//!
//! SIGINT (Ctrl+C) and SIGTERM both request a graceful shutdown.

use std::future::Future;
use std::io;

use tokio::signal;

use crate::lifecycle::Shutdown;

/// Which signal ended the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    Interrupt,
    Terminate,
}

/// Wait for Ctrl+C or, on unix, SIGTERM.
pub async fn wait_for_stop() -> io::Result<StopSignal> {
    let ctrl_c = async { signal::ctrl_c().await.map(|()| StopSignal::Interrupt) };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())?
            .recv()
            .await;
        Ok::<_, io::Error>(StopSignal::Terminate)
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<io::Result<StopSignal>>();

    tokio::select! {
        res = ctrl_c => res,
        res = terminate => res,
    }
}

/// Trigger `shutdown` once `stop` reports a signal.
///
/// If waiting fails the coordinator is kept alive and never triggered.
pub async fn shutdown_on_stop<W>(shutdown: Shutdown, stop: W)
where
    W: Future<Output = io::Result<StopSignal>>,
{
    match stop.await {
        Ok(signal) => {
            tracing::info!(signal = ?signal, "Demo stopped by user");
            shutdown.trigger();
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install signal handlers, serving without them");
            let _held = shutdown;
            std::future::pending::<()>().await;
        }
    }
}
