//! OS signal handling.
//!
//! # Responsibilities
//! - Register handlers for SIGTERM and SIGINT
//! - Translate either into the shutdown broadcast
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - The first signal wins; later ones are ignored while draining

use std::sync::Arc;

use futures_util::stream::{self, Stream, StreamExt};
use tokio::task::JoinHandle;

use crate::lifecycle::Shutdown;

/// Resolve once a termination signal arrives, naming it.
#[cfg(unix)]
pub async fn termination_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = terminate.recv() => Ok("SIGTERM"),
        _ = interrupt.recv() => Ok("SIGINT"),
    }
}

#[cfg(not(unix))]
pub async fn termination_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}

/// Trigger `shutdown` on the first termination signal. Later signals only
/// log while the gateway drains.
pub fn spawn_signal_listener(shutdown: Arc<Shutdown>) -> JoinHandle<()> {
    let signals = stream::unfold((), |()| async { Some((termination_signal().await, ())) });
    tokio::spawn(forward_signals(shutdown, signals))
}

/// Turn each signal from `signals` into a shutdown request. Stops when the
/// stream ends or a handler cannot be installed.
pub async fn forward_signals<S>(shutdown: Arc<Shutdown>, signals: S)
where
    S: Stream<Item = std::io::Result<&'static str>>,
{
    tokio::pin!(signals);
    while let Some(next) = signals.next().await {
        match next {
            Ok(signal) if shutdown.trigger() => {
                tracing::info!(signal, status = "shutting down", "Shutdown requested, performing graceful exit");
            }
            Ok(signal) => {
                tracing::warn!(signal, "Shutdown already in progress");
            }
            Err(error) => {
                tracing::error!(%error, "Failed to install signal handlers");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_signal_triggers_shutdown_once() {
        let shutdown = Arc::new(Shutdown::new());
        let mut rx = shutdown.subscribe();

        let signals = stream::iter([Ok("SIGTERM"), Ok("SIGINT")]);
        forward_signals(Arc::clone(&shutdown), signals).await;

        assert!(shutdown.is_triggered());
        assert!(rx.recv().await.is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn handler_failure_stops_without_shutdown() {
        let shutdown = Arc::new(Shutdown::new());

        let signals = stream::iter([
            Err(std::io::Error::other("no signal driver")),
            Ok("SIGTERM"),
        ]);
        forward_signals(Arc::clone(&shutdown), signals).await;

        assert!(!shutdown.is_triggered());
    }

    #[tokio::test]
    async fn no_signal_no_shutdown() {
        let shutdown = Arc::new(Shutdown::new());
        forward_signals(Arc::clone(&shutdown), stream::empty()).await;
        assert!(!shutdown.is_triggered());
    }
}
