//! Connection dispatcher.
//!
//! # Responsibilities
//! - Receive every request and every upgrade from the server loop
//! - Classify it against the dispatch chain
//! - Hand it to exactly one handler: a tunnel, the application server, or
//!   nobody (silent close for upgrades)
//!
//! # Design Decisions
//! - Stateless between events; holds only the chain and the application
//! - Classification is synchronous and never touches the upgraded socket
//! - Handler errors are the handler's business; the dispatcher neither
//!   catches nor masks them

use axum::body::Body;
use axum::http::{Request, Response};
use tracing::Instrument;

use crate::app::AppServer;
use crate::http::request::RequestId;
use crate::http::response::Refused;
use crate::http::websocket::{is_upgrade_request, UpgradeEvent};
use crate::observability::metrics;
use crate::routing::router::{DispatchChain, RequestTarget, UpgradeTarget};

/// Routes each inbound event to a single owner.
#[derive(Clone)]
pub struct Dispatcher {
    chain: DispatchChain,
    app: AppServer,
}

impl Dispatcher {
    pub fn new(chain: DispatchChain, app: AppServer) -> Self {
        Self { chain, app }
    }

    pub fn chain(&self) -> &DispatchChain {
        &self.chain
    }

    /// Entry point for the server loop.
    pub async fn dispatch(&self, req: Request<Body>) -> Result<Response<Body>, Refused> {
        let request_id = RequestId::from_request(&req);
        let span = tracing::debug_span!(
            "dispatch",
            request_id = %request_id,
            method = %req.method(),
            path = %req.uri().path(),
        );

        if is_upgrade_request(&req) {
            self.handle_upgrade(UpgradeEvent::new(req))
                .instrument(span)
                .await
        } else {
            Ok(self.handle_request(req).instrument(span).await)
        }
    }

    /// Plain request: tunnel proxy if it claims the request, else the
    /// application server.
    pub async fn handle_request(&self, req: Request<Body>) -> Response<Body> {
        let target = self.chain.classify_request(&req);
        tracing::debug!(handler = target.name(), "Request classified");
        metrics::record_dispatch("request", target.name());

        match target {
            RequestTarget::Tunnel(adapter) => adapter.handle_request(req).await,
            RequestTarget::Application => self.app.serve(req).await,
        }
    }

    /// Upgrade: first claiming tunnel takes the socket; unclaimed upgrades
    /// are refused and the socket is dropped without a handshake.
    pub async fn handle_upgrade(&self, event: UpgradeEvent) -> Result<Response<Body>, Refused> {
        let target = self.chain.classify_upgrade(event.request());
        tracing::debug!(handler = target.name(), "Upgrade classified");
        metrics::record_dispatch("upgrade", target.name());

        match target {
            UpgradeTarget::Tunnel(adapter) => Ok(adapter.handle_upgrade(event).await),
            UpgradeTarget::Refuse => {
                drop(event);
                Err(Refused)
            }
        }
    }
}
