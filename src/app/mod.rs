//! Application server subsystem.
//!
//! # Data Flow
//! ```text
//! Request not claimed by a tunnel
//!     → server.rs (axum router: pages, redirects, mounts, static dir)
//!     → worker.rs (remote worker script, fetched per request)
//!     → 404 page when nothing matched
//! ```

pub mod server;
pub mod worker;

pub use server::AppServer;
pub use worker::{FetchError, WorkerScript, WORKER_FETCH_ERROR};
