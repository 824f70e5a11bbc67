//! Request matching logic.
//!
//! # Responsibilities
//! - Match path prefix (tunnel proxy directory)
//! - Match path suffix (WebSocket tunnel endpoint)
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Only the path is inspected; the query string never affects a match
//! - No regex to guarantee O(n) matching

use axum::body::Body;
use axum::http::Request;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.uri().path().starts_with(&self.prefix)
    }
}

/// Matches the request path suffix.
#[derive(Debug, Clone)]
pub struct PathSuffixMatcher {
    suffix: String,
}

impl PathSuffixMatcher {
    /// Create a new path suffix matcher.
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

impl Matcher for PathSuffixMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.uri().path().ends_with(&self.suffix)
    }
}
