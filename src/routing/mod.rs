//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request or upgrade
//!     → router.rs (dispatch chain: which tunnel, if any, owns it)
//!     → matcher.rs (path prefix / suffix predicates)
//!
//! Application pages (at startup):
//!     RouteConfig[]
//!     → table.rs (exact-path table, frozen)
//! ```
//!
//! # Design Decisions
//! - Chain and table built at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always yields the same target
//! - First match wins (ordered by insertion)

pub mod matcher;
pub mod router;
pub mod table;

pub use router::{DispatchChain, RequestTarget, UpgradeTarget};
pub use table::{RouteEntry, RouteTable};
