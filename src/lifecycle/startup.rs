//! Startup orchestration.
//!
//! # Responsibilities
//! - Build every subsystem from a validated configuration
//! - Announce the running gateway
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order: route table, application server,
//!   tunnel adapters, dispatch chain, dispatcher
//! - Listeners are bound by the caller, after the server is ready

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::app::{AppServer, WorkerScript};
use crate::config::GatewayConfig;
use crate::http::{Dispatcher, HttpServer};
use crate::routing::router::DispatchChain;
use crate::routing::table::{RouteTable, RouteTableError};
use crate::tunnel::{RelayError, TunnelProxy, WebSocketTunnel};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("route table: {0}")]
    Routes(#[from] RouteTableError),
    #[error("worker script client: {0}")]
    WorkerClient(#[from] reqwest::Error),
    #[error("tunnel adapter: {0}")]
    Tunnel(#[from] RelayError),
}

/// Construct the gateway server from configuration.
pub fn build(config: &GatewayConfig) -> Result<HttpServer, StartupError> {
    let routes = RouteTable::from_config(&config.routes, &config.assets.static_dir)?;
    let worker = WorkerScript::from_config(&config.worker)?;
    let app = AppServer::from_config(config, &routes, worker);

    let connect_timeout = Duration::from_secs(config.timeouts.upstream_connect_secs);
    let tunnel_proxy = TunnelProxy::from_config(&config.tunnel_proxy, connect_timeout)?;
    let websocket_tunnel = WebSocketTunnel::from_config(&config.websocket_tunnel, connect_timeout)?;

    let chain = DispatchChain::new()
        .tunnel(Arc::new(tunnel_proxy))
        .upgrade_only(Arc::new(websocket_tunnel));

    tracing::debug!(
        routes = routes.entries().len(),
        requests = ?chain.request_order(),
        upgrades = ?chain.upgrade_order(),
        "Dispatch chain ready"
    );

    Ok(HttpServer::new(
        Dispatcher::new(chain, app),
        Duration::from_secs(config.timeouts.shutdown_grace_secs),
    ))
}

/// Log the startup banner.
pub fn log_banner(addr: SocketAddr) {
    tracing::info!(
        status = "active",
        port = addr.port(),
        version = env!("CARGO_PKG_VERSION"),
        url = %format!("http://localhost:{}", addr.port()),
        "Doge gateway is running"
    );
}
