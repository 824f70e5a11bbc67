//! Tunnel adapters.
//!
//! # Data Flow
//! ```text
//! Dispatcher
//!     → TunnelAdapter::matches (pure predicate)
//!     → handle_request / handle_upgrade (owns the request or socket from here)
//!     → relay.rs (external tunnel service)
//! ```
//!
//! # Design Decisions
//! - Tunnel protocols stay opaque: adapters only move bytes to the service
//!   that speaks them
//! - Object-safe traits with boxed futures so the dispatch chain is a plain
//!   list of `Arc<dyn ...>`
//! - Adapters never fail towards the dispatcher; errors become responses

pub mod proxy;
pub mod relay;
pub mod wisp;

use axum::body::Body;
use axum::http::{Request, Response};
use futures_util::future::BoxFuture;

use crate::http::websocket::UpgradeEvent;

pub use proxy::TunnelProxy;
pub use relay::{RelayError, UpstreamRelay};
pub use wisp::WebSocketTunnel;

/// A tunnel that can claim upgrade requests.
pub trait TunnelAdapter: Send + Sync {
    /// Name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Returns true if this tunnel owns the request.
    fn matches(&self, req: &Request<Body>) -> bool;

    /// Take over an upgrade and produce its handshake response.
    fn handle_upgrade(&self, event: UpgradeEvent) -> BoxFuture<'static, Response<Body>>;
}

/// A tunnel that also claims plain requests.
pub trait RequestTunnel: TunnelAdapter {
    fn handle_request(&self, req: Request<Body>) -> BoxFuture<'static, Response<Body>>;
}
