//! Request identification.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Expose it for log correlation
//!
//! # Design Decisions
//! - The ID lives in the dispatch span only; the request is never modified
//! - A client-supplied `x-request-id` is reused as-is

use axum::http::Request;
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation ID carried in the `x-request-id` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// The client's ID if it sent one, else a fresh UUID.
    pub fn from_request<B>(req: &Request<B>) -> Self {
        req.headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(|existing| Self(existing.to_string()))
            .unwrap_or_else(|| Self(Uuid::new_v4().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_id_without_touching_request() {
        let req = Request::builder().uri("/").body(()).unwrap();
        let id = RequestId::from_request(&req);
        assert!(Uuid::parse_str(id.as_str()).is_ok());
        assert!(req.headers().get(X_REQUEST_ID).is_none());

        // No header means a new ID each time.
        assert_ne!(RequestId::from_request(&req), id);
    }

    #[test]
    fn keeps_client_id() {
        let req = Request::builder()
            .uri("/")
            .header(X_REQUEST_ID, "abc-123")
            .body(())
            .unwrap();
        assert_eq!(RequestId::from_request(&req).as_str(), "abc-123");
    }
}
