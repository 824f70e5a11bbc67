//! HTTP-transport tunnel proxy adapter.
//!
//! Claims every request, plain or upgrade, whose path lives under the tunnel
//! directory (`/bear/` by default) and relays it to the tunnel service.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use futures_util::future::BoxFuture;

use crate::config::TunnelProxyConfig;
use crate::http::websocket::UpgradeEvent;
use crate::routing::matcher::{Matcher, PathPrefixMatcher};
use crate::tunnel::relay::{RelayError, UpstreamRelay};
use crate::tunnel::{RequestTunnel, TunnelAdapter};

pub struct TunnelProxy {
    matcher: PathPrefixMatcher,
    relay: UpstreamRelay,
}

impl TunnelProxy {
    pub const NAME: &'static str = "tunnel-proxy";

    pub fn from_config(
        config: &TunnelProxyConfig,
        connect_timeout: Duration,
    ) -> Result<Self, RelayError> {
        Ok(Self {
            matcher: PathPrefixMatcher::new(config.prefix.clone()),
            relay: UpstreamRelay::new(Self::NAME, &config.upstream, connect_timeout)?,
        })
    }
}

impl TunnelAdapter for TunnelProxy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn matches(&self, req: &Request<Body>) -> bool {
        self.matcher.matches(req)
    }

    fn handle_upgrade(&self, event: UpgradeEvent) -> BoxFuture<'static, Response<Body>> {
        let relay = self.relay.clone();
        Box::pin(async move { relay.upgrade(event).await })
    }
}

impl RequestTunnel for TunnelProxy {
    fn handle_request(&self, req: Request<Body>) -> BoxFuture<'static, Response<Body>> {
        let relay = self.relay.clone();
        Box::pin(async move { relay.forward(req).await })
    }
}
