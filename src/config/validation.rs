//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, connection limit > 0)
//! - Detect paths claimed twice by the application server
//! - Check tunnel prefixes, suffixes and upstream addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Component, Path};
use std::str::FromStr;

use axum::http::uri::Authority;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),
    #[error("listener.max_connections must be greater than zero")]
    NoConnections,
    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
    #[error("{field} {path:?} must start with '/'")]
    RelativePath { field: &'static str, path: String },
    #[error("path {0:?} is claimed more than once")]
    DuplicatePath(String),
    #[error("route file {0:?} must stay inside the static directory")]
    EscapingFile(String),
    #[error("worker.url {0:?} is not an http(s) URL")]
    WorkerUrl(String),
    #[error("tunnel_proxy.prefix {0:?} must start and end with '/'")]
    TunnelPrefix(String),
    #[error("websocket_tunnel.suffix {0:?} must end with '/'")]
    TunnelSuffix(String),
    #[error("{field} {value:?} is not a host:port address")]
    Upstream { field: &'static str, value: String },
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::NoConnections);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if config.timeouts.upstream_connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream_connect_secs"));
    }

    // Exact paths answered by the application server must be unique.
    let mut claimed = HashSet::new();
    let exact_paths = config
        .routes
        .iter()
        .map(|r| ("routes.path", r.path.as_str()))
        .chain(config.redirects.iter().map(|r| ("redirects.from", r.from.as_str())))
        .chain(std::iter::once(("worker.path", config.worker.path.as_str())));
    for (field, path) in exact_paths {
        if !path.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                field,
                path: path.to_string(),
            });
        }
        if !claimed.insert(path) {
            errors.push(ValidationError::DuplicatePath(path.to_string()));
        }
    }

    for route in &config.routes {
        if !stays_inside(&route.file) {
            errors.push(ValidationError::EscapingFile(route.file.display().to_string()));
        }
    }

    for mount in &config.mounts {
        if !mount.prefix.starts_with('/') || mount.prefix.trim_matches('/').is_empty() {
            errors.push(ValidationError::RelativePath {
                field: "mounts.prefix",
                path: mount.prefix.clone(),
            });
        }
    }

    match url::Url::parse(&config.worker.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::WorkerUrl(config.worker.url.clone())),
    }

    let prefix = &config.tunnel_proxy.prefix;
    if prefix.len() < 2 || !prefix.starts_with('/') || !prefix.ends_with('/') {
        errors.push(ValidationError::TunnelPrefix(prefix.clone()));
    }
    let suffix = &config.websocket_tunnel.suffix;
    if suffix.len() < 2 || !suffix.ends_with('/') {
        errors.push(ValidationError::TunnelSuffix(suffix.clone()));
    }

    for (field, value) in [
        ("tunnel_proxy.upstream", &config.tunnel_proxy.upstream),
        ("websocket_tunnel.upstream", &config.websocket_tunnel.upstream),
    ] {
        if !is_host_port(value) {
            errors.push(ValidationError::Upstream {
                field,
                value: value.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn stays_inside(file: &Path) -> bool {
    file.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn is_host_port(value: &str) -> bool {
    Authority::from_str(value)
        .map(|authority| authority.port_u16().is_some() && !authority.host().is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{RedirectConfig, RouteConfig};
    use std::path::PathBuf;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.listener.max_connections = 0;
        config.worker.url = "ftp://example.com/worker.js".into();
        config.tunnel_proxy.prefix = "bear".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::NoConnections));
        assert!(errors.contains(&ValidationError::TunnelPrefix("bear".into())));
    }

    #[test]
    fn redirect_colliding_with_route_is_rejected() {
        let mut config = GatewayConfig::default();
        config.redirects.push(RedirectConfig {
            from: "/portal".into(),
            to: "/app".into(),
        });
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::DuplicatePath("/portal".into())]);
    }

    #[test]
    fn route_files_cannot_escape_static_dir() {
        let mut config = GatewayConfig::default();
        config.routes.push(RouteConfig {
            path: "/secret".into(),
            file: PathBuf::from("../Cargo.toml"),
        });
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::EscapingFile("../Cargo.toml".into())]);
    }

    #[test]
    fn upstream_needs_a_port() {
        let mut config = GatewayConfig::default();
        config.websocket_tunnel.upstream = "localhost".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::Upstream { field: "websocket_tunnel.upstream", .. }]
        ));
    }
}
