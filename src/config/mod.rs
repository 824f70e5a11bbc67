//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → consumed once by lifecycle::startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the route table never changes at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AssetConfig, GatewayConfig, ListenerConfig, MountConfig, ObservabilityConfig, RedirectConfig,
    RouteConfig, TimeoutConfig, TunnelProxyConfig, WebSocketTunnelConfig, WorkerScriptConfig,
};
pub use validation::{validate_config, ValidationError};
