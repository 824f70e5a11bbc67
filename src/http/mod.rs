//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper connection, upgrades enabled)
//!     → request.rs (request ID)
//!     → dispatcher.rs (classify: tunnel proxy, WebSocket tunnel, application)
//!     → websocket.rs (upgrade events hand the socket to one owner)
//!     → response.rs (plain error responses, silent refusal)
//! ```

pub mod dispatcher;
pub mod request;
pub mod response;
pub mod server;
pub mod websocket;

pub use dispatcher::Dispatcher;
pub use request::{RequestId, X_REQUEST_ID};
pub use response::Refused;
pub use server::HttpServer;
pub use websocket::UpgradeEvent;
