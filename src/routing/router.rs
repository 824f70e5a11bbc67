//! Dispatch precedence.
//!
//! # Responsibilities
//! - Store tunnel adapters in precedence order
//! - Classify plain requests: first matching tunnel, else the application
//! - Classify upgrades: first matching tunnel, else refuse
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Insertion order is precedence; the order is data, not control flow
//! - Deterministic: same request always yields the same target
//! - Explicit fallback variants rather than a silent default

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;

use crate::tunnel::{RequestTunnel, TunnelAdapter};

/// Where a plain request goes.
pub enum RequestTarget<'a> {
    Tunnel(&'a Arc<dyn RequestTunnel>),
    Application,
}

impl RequestTarget<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            RequestTarget::Tunnel(adapter) => adapter.name(),
            RequestTarget::Application => "application",
        }
    }
}

/// Where an upgrade goes.
pub enum UpgradeTarget<'a> {
    Tunnel(&'a Arc<dyn TunnelAdapter>),
    Refuse,
}

impl UpgradeTarget<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            UpgradeTarget::Tunnel(adapter) => adapter.name(),
            UpgradeTarget::Refuse => "refused",
        }
    }
}

/// Ordered tunnel adapters consulted before the fallbacks.
#[derive(Clone, Default)]
pub struct DispatchChain {
    requests: Vec<Arc<dyn RequestTunnel>>,
    upgrades: Vec<Arc<dyn TunnelAdapter>>,
}

impl DispatchChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tunnel that claims both plain requests and upgrades.
    pub fn tunnel<T: RequestTunnel + 'static>(mut self, adapter: Arc<T>) -> Self {
        self.upgrades.push(adapter.clone());
        self.requests.push(adapter);
        self
    }

    /// Append a tunnel that claims upgrades only.
    pub fn upgrade_only<T: TunnelAdapter + 'static>(mut self, adapter: Arc<T>) -> Self {
        self.upgrades.push(adapter);
        self
    }

    pub fn classify_request(&self, req: &Request<Body>) -> RequestTarget<'_> {
        self.requests
            .iter()
            .find(|adapter| adapter.matches(req))
            .map_or(RequestTarget::Application, RequestTarget::Tunnel)
    }

    pub fn classify_upgrade(&self, req: &Request<Body>) -> UpgradeTarget<'_> {
        self.upgrades
            .iter()
            .find(|adapter| adapter.matches(req))
            .map_or(UpgradeTarget::Refuse, UpgradeTarget::Tunnel)
    }

    /// Adapter names consulted for plain requests, in order.
    pub fn request_order(&self) -> Vec<&'static str> {
        self.requests.iter().map(|a| a.name()).collect()
    }

    /// Adapter names consulted for upgrades, in order.
    pub fn upgrade_order(&self) -> Vec<&'static str> {
        self.upgrades.iter().map(|a| a.name()).collect()
    }
}
