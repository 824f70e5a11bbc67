//! Response helpers and the refusal signal.
//!
//! # Responsibilities
//! - Build small plain-text responses for locally recovered errors
//! - Represent the silent refusal of an unclaimed upgrade
//!
//! # Design Decisions
//! - Every failure the client sees is a well-formed HTTP response, except
//!   a refused upgrade, which closes the socket without writing a byte

use axum::body::Body;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;

/// Returned for an upgrade no handler claimed.
///
/// Surfacing it as a service error makes hyper drop the connection without
/// sending a handshake or status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("upgrade refused: no tunnel claimed the request")]
pub struct Refused;

/// A `text/plain` response with a fixed message.
pub fn plain(status: StatusCode, message: &'static str) -> Response<Body> {
    (status, message).into_response()
}
