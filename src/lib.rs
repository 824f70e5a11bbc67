//! Doge gateway library.
//!
//! One listening socket fronting static pages, an HTTP-transport tunnel proxy
//! and a WebSocket tunnel. Every request and every upgrade is classified once
//! and handed to exactly one owner.

pub mod app;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod tunnel;

pub use config::GatewayConfig;
pub use http::{Dispatcher, HttpServer};
pub use lifecycle::Shutdown;
