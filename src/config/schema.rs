//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files, and
//! every section has a default so an empty file yields the stock deployment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Static asset locations.
    pub assets: AssetConfig,

    /// Exact-path pages served from the static directory.
    pub routes: Vec<RouteConfig>,

    /// Fixed redirects answered by the application server.
    pub redirects: Vec<RedirectConfig>,

    /// Read-only directory mounts for vendor transport assets.
    pub mounts: Vec<MountConfig>,

    /// Remote worker script proxy.
    pub worker: WorkerScriptConfig,

    /// HTTP-transport tunnel proxy.
    pub tunnel_proxy: TunnelProxyConfig,

    /// WebSocket tunnel.
    pub websocket_tunnel: WebSocketTunnelConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            assets: AssetConfig::default(),
            routes: default_routes(),
            redirects: vec![RedirectConfig {
                from: "/student".to_string(),
                to: "/portal".to_string(),
            }],
            mounts: vec![
                MountConfig {
                    prefix: "/libcurl/".to_string(),
                    dir: PathBuf::from("vendor/libcurl"),
                },
                MountConfig {
                    prefix: "/baremux/".to_string(),
                    dir: PathBuf::from("vendor/baremux"),
                },
            ],
            worker: WorkerScriptConfig::default(),
            tunnel_proxy: TunnelProxyConfig::default(),
            websocket_tunnel: WebSocketTunnelConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

fn default_routes() -> Vec<RouteConfig> {
    [
        ("/app", "index.html"),
        ("/portal", "loader.html"),
        ("/apps", "apps.html"),
        ("/gms", "gms.html"),
        ("/lessons", "agloader.html"),
        ("/info", "info.html"),
        ("/edu", "loading.html"),
    ]
    .into_iter()
    .map(|(path, file)| RouteConfig {
        path: path.to_string(),
        file: PathBuf::from(file),
    })
    .collect()
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Application server request timeout in seconds.
    pub request_secs: u64,

    /// Connection establishment timeout towards tunnel upstreams in seconds.
    pub upstream_connect_secs: u64,

    /// How long in-flight connections may drain after a shutdown signal.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_connect_secs: 10,
            shutdown_grace_secs: 30,
        }
    }
}

/// Static asset locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory served for every path not claimed elsewhere.
    pub static_dir: PathBuf,

    /// Page served with a 404 status, relative to `static_dir`.
    pub not_found_page: PathBuf,
}

impl AssetConfig {
    /// Full path of the not-found page.
    pub fn not_found_path(&self) -> PathBuf {
        self.static_dir.join(&self.not_found_page)
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("static"),
            not_found_page: PathBuf::from("404.html"),
        }
    }
}

/// Exact-path page mapping.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Request path to match exactly.
    pub path: String,

    /// Asset file, relative to the static directory.
    pub file: PathBuf,
}

/// Fixed redirect.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedirectConfig {
    /// Request path to match exactly.
    pub from: String,

    /// Location sent back to the client.
    pub to: String,
}

/// Directory exposed verbatim under a path prefix.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MountConfig {
    /// Path prefix, e.g. "/libcurl/".
    pub prefix: String,

    /// Directory on disk.
    pub dir: PathBuf,
}

/// Remote worker script proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerScriptConfig {
    /// Local path the script is served on.
    pub path: String,

    /// Remote location fetched on every request.
    pub url: String,

    /// Upstream fetch timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WorkerScriptConfig {
    fn default() -> Self {
        Self {
            path: "/worker.js".to_string(),
            url: "https://cdn.surfdoge.pro/worker.js".to_string(),
            timeout_secs: 10,
        }
    }
}

/// HTTP-transport tunnel proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TunnelProxyConfig {
    /// Path prefix claimed by the tunnel, for plain and upgrade requests.
    pub prefix: String,

    /// Tunnel service address (e.g., "127.0.0.1:8080").
    pub upstream: String,
}

impl Default for TunnelProxyConfig {
    fn default() -> Self {
        Self {
            prefix: "/bear/".to_string(),
            upstream: "127.0.0.1:8080".to_string(),
        }
    }
}

/// WebSocket tunnel configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebSocketTunnelConfig {
    /// Path suffix claimed by the tunnel, upgrade requests only.
    pub suffix: String,

    /// Tunnel service address (e.g., "127.0.0.1:6001").
    pub upstream: String,
}

impl Default for WebSocketTunnelConfig {
    fn default() -> Self {
        Self {
            suffix: "/wisp/".to_string(),
            upstream: "127.0.0.1:6001".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_stock_deployment() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8000");
        assert_eq!(config.routes.len(), 7);
        assert_eq!(config.redirects[0].from, "/student");
        assert_eq!(config.redirects[0].to, "/portal");
        assert_eq!(config.worker.url, "https://cdn.surfdoge.pro/worker.js");
        assert_eq!(config.tunnel_proxy.prefix, "/bear/");
        assert_eq!(config.websocket_tunnel.suffix, "/wisp/");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [worker]
            url = "http://localhost:3000/worker.js"
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.listener.max_connections, 10_000);
        assert_eq!(config.worker.path, "/worker.js");
        assert_eq!(config.worker.timeout_secs, 10);
    }

    #[test]
    fn explicit_routes_replace_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [[routes]]
            path = "/home"
            file = "home.html"
            "#,
        )
        .unwrap();
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].file, PathBuf::from("home.html"));
    }
}
