//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use doge_gateway::config::{GatewayConfig, MountConfig, RouteConfig};
use doge_gateway::lifecycle::startup;
use doge_gateway::net::Listener;
use doge_gateway::Shutdown;

/// Read an HTTP request head off the socket.
async fn read_head(socket: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// Start a programmable backend. The closure sees the request head and
/// returns the status and body to answer with.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let head = read_head(&mut socket).await;
                let (status, body) = f(head).await;
                let status_text = match status {
                    200 => "200 OK",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start a backend that always answers with the same body.
pub async fn start_mock_backend(response: &'static str) -> SocketAddr {
    start_programmable_backend(move |_| async move { (200, response.to_string()) }).await
}

/// Start a WebSocket server that echoes text and binary messages.
pub async fn start_websocket_echo() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(socket).await else {
                    return;
                };
                while let Some(Ok(message)) = ws.next().await {
                    if message.is_text() || message.is_binary() {
                        if ws.send(message).await.is_err() {
                            break;
                        }
                    }
                }
            });
        }
    });

    addr
}

/// A bound address that nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Write the stock pages into `root`.
pub fn write_assets(root: &Path) {
    let static_dir = root.join("static");
    let vendor = root.join("vendor/libcurl");
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::create_dir_all(&vendor).unwrap();
    std::fs::write(static_dir.join("index.html"), "home page").unwrap();
    std::fs::write(static_dir.join("loader.html"), "portal page").unwrap();
    std::fs::write(static_dir.join("404.html"), "not found page").unwrap();
    std::fs::write(vendor.join("index.mjs"), "libcurl transport").unwrap();
}

/// Gateway configuration pointing at `root` and the given upstreams.
pub fn test_config(
    root: &Path,
    worker: SocketAddr,
    tunnel: SocketAddr,
    websocket: SocketAddr,
) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.timeouts.shutdown_grace_secs = 5;
    config.timeouts.upstream_connect_secs = 2;
    config.assets.static_dir = root.join("static");
    config.routes = vec![
        RouteConfig {
            path: "/app".into(),
            file: "index.html".into(),
        },
        RouteConfig {
            path: "/portal".into(),
            file: "loader.html".into(),
        },
    ];
    config.mounts = vec![MountConfig {
        prefix: "/libcurl/".into(),
        dir: root.join("vendor/libcurl"),
    }];
    config.worker.url = format!("http://{worker}/worker.js");
    config.worker.timeout_secs = 2;
    config.tunnel_proxy.upstream = tunnel.to_string();
    config.websocket_tunnel.upstream = websocket.to_string();
    config
}

/// A gateway running on an ephemeral port.
pub struct RunningGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<()>,
}

impl RunningGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server to finish draining.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("gateway did not stop")
            .unwrap();
    }
}

pub async fn start_gateway(config: GatewayConfig) -> RunningGateway {
    let server = startup::build(&config).unwrap();
    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        server.run(listener, server_shutdown).await.unwrap();
    });

    RunningGateway {
        addr,
        shutdown,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
