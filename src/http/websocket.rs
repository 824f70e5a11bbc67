//! Protocol upgrade events.
//!
//! # Responsibilities
//! - Detect upgrade requests (WebSocket handshakes and friends)
//! - Detach the connection's upgrade handle from the request
//! - Hand the pair to exactly one handler
//!
//! # Design Decisions
//! - The dispatcher never reads or writes the upgraded stream itself
//! - Bytes the server already read past the handshake travel inside
//!   hyper's `Upgraded` and are replayed to whoever reads it
//! - Dropping an event without answering closes the socket

use axum::body::Body;
use axum::http::{header, Request};
use hyper::upgrade::OnUpgrade;

/// Returns true when the request asks to switch protocols.
pub fn is_upgrade_request<B>(req: &Request<B>) -> bool {
    let connection_upgrade = req
        .headers()
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|token| token.trim().eq_ignore_ascii_case("upgrade"));
    connection_upgrade && req.headers().contains_key(header::UPGRADE)
}

/// An incoming upgrade: the originating request plus the connection handle
/// that resolves once the handshake response has been written.
#[derive(Debug)]
pub struct UpgradeEvent {
    request: Request<Body>,
    socket: OnUpgrade,
}

impl UpgradeEvent {
    /// Take the upgrade handle out of `request`.
    ///
    /// Requests that did not arrive over a real connection still produce an
    /// event; awaiting their socket yields an error.
    pub fn new(mut request: Request<Body>) -> Self {
        let socket = hyper::upgrade::on(&mut request);
        Self { request, socket }
    }

    pub fn request(&self) -> &Request<Body> {
        &self.request
    }

    /// Transfer ownership of the request and its socket to a handler.
    pub fn into_parts(self) -> (Request<Body>, OnUpgrade) {
        (self.request, self.socket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_websocket_handshake() {
        let req = Request::builder()
            .uri("/wisp/")
            .header("connection", "keep-alive, Upgrade")
            .header("upgrade", "websocket")
            .body(())
            .unwrap();
        assert!(is_upgrade_request(&req));
    }

    #[test]
    fn upgrade_header_alone_is_not_enough() {
        let req = Request::builder()
            .uri("/wisp/")
            .header("upgrade", "websocket")
            .body(())
            .unwrap();
        assert!(!is_upgrade_request(&req));

        let req = Request::builder()
            .uri("/wisp/")
            .header("connection", "upgrade")
            .body(())
            .unwrap();
        assert!(!is_upgrade_request(&req));
    }

    #[tokio::test]
    async fn detached_socket_without_connection_errors() {
        let req = Request::builder().uri("/wisp/").body(Body::empty()).unwrap();
        let event = UpgradeEvent::new(req);
        assert_eq!(event.request().uri().path(), "/wisp/");

        let (_, socket) = event.into_parts();
        assert!(socket.await.is_err());
    }
}
