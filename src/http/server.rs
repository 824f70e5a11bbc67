//! HTTP server: accept loop and graceful shutdown.
//!
//! # Responsibilities
//! - Accept connections on the single gateway socket
//! - Serve each connection on its own task (HTTP/1.1 and HTTP/2, upgrades on)
//! - Hand every request to the dispatcher
//! - On shutdown: stop accepting, close the socket, drain in-flight work
//!
//! # Design Decisions
//! - A slow or panicking connection task never blocks the accept loop
//! - A refused upgrade surfaces as a service error so hyper closes the
//!   connection without writing a response

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use tokio::net::TcpStream;
use tokio::sync::broadcast;

use crate::http::dispatcher::Dispatcher;
use crate::net::{ConnectionPermit, ConnectionTracker, Listener, ListenerError};

/// HTTP server for the gateway.
pub struct HttpServer {
    dispatcher: Arc<Dispatcher>,
    shutdown_grace: Duration,
}

impl HttpServer {
    pub fn new(dispatcher: Dispatcher, shutdown_grace: Duration) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            shutdown_grace,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run the server until `shutdown` fires, then drain and return.
    ///
    /// The listener is consumed; it is closed exactly once, when the accept
    /// loop ends.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        let addr = listener.local_addr().map_err(ListenerError::Accept)?;
        tracing::info!(address = %addr, "HTTP server starting");

        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer, permit)) => {
                        self.spawn_connection(stream, peer, permit, &tracker);
                    }
                    Err(ListenerError::Accept(error)) => {
                        tracing::warn!(%error, "Unable to accept connection");
                    }
                    Err(error) => return Err(error),
                },
            }
        }

        drop(listener);
        tracing::info!(address = %addr, "Listening socket closed");

        tracker.begin_drain();
        let open = tracker.active_count();
        if open > 0 {
            tracing::info!(connections = open, "Draining in-flight connections");
        }
        if !tracker.wait_for_drain(self.shutdown_grace).await {
            tracing::warn!(
                connections = tracker.active_count(),
                grace_secs = self.shutdown_grace.as_secs(),
                "Grace period elapsed with connections still open"
            );
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    fn spawn_connection(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
        permit: ConnectionPermit,
        tracker: &ConnectionTracker,
    ) {
        if let Err(error) = stream.set_nodelay(true) {
            tracing::warn!(%error, %peer, "Error setting nodelay");
        }

        let guard = tracker.track();
        let mut drain = tracker.drain_receiver();
        let dispatcher = Arc::clone(&self.dispatcher);

        tokio::spawn(async move {
            let connection_id = guard.id();
            let service = service_fn(move |req: Request<Incoming>| {
                let dispatcher = Arc::clone(&dispatcher);
                async move { dispatcher.dispatch(req.map(Body::new)).await }
            });

            let builder = auto::Builder::new(TokioExecutor::new());
            let conn = builder.serve_connection_with_upgrades(TokioIo::new(stream), service);
            tokio::pin!(conn);

            let result = tokio::select! {
                result = conn.as_mut() => result,
                _ = drain.changed() => {
                    conn.as_mut().graceful_shutdown();
                    conn.await
                }
            };
            if let Err(error) = result {
                tracing::debug!(%connection_id, %peer, %error, "Connection ended with error");
            }

            drop(permit);
            drop(guard);
        });
    }
}
