//! WebSocket tunnel adapter.
//!
//! Claims upgrade requests whose path ends with the tunnel suffix (`/wisp/`
//! by default). Plain requests to the same path are never routed here.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use futures_util::future::BoxFuture;

use crate::config::WebSocketTunnelConfig;
use crate::http::websocket::UpgradeEvent;
use crate::routing::matcher::{Matcher, PathSuffixMatcher};
use crate::tunnel::relay::{RelayError, UpstreamRelay};
use crate::tunnel::TunnelAdapter;

pub struct WebSocketTunnel {
    matcher: PathSuffixMatcher,
    relay: UpstreamRelay,
}

impl WebSocketTunnel {
    pub const NAME: &'static str = "websocket-tunnel";

    pub fn from_config(
        config: &WebSocketTunnelConfig,
        connect_timeout: Duration,
    ) -> Result<Self, RelayError> {
        Ok(Self {
            matcher: PathSuffixMatcher::new(config.suffix.clone()),
            relay: UpstreamRelay::new(Self::NAME, &config.upstream, connect_timeout)?,
        })
    }
}

impl TunnelAdapter for WebSocketTunnel {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_suffix_anywhere() {
        let config = WebSocketTunnelConfig {
            suffix: "/wisp/".into(),
            upstream: "127.0.0.1:6001".into(),
        };
        let tunnel = WebSocketTunnel::from_config(&config, Duration::from_secs(1)).unwrap();
        let req = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

        assert!(tunnel.matches(&req("/wisp/")));
        assert!(tunnel.matches(&req("/service/wisp/")));
        assert!(!tunnel.matches(&req("/wisp")));
        assert!(!tunnel.matches(&req("/random-path/")));
    }
}
