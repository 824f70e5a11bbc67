//! Doge gateway
//!
//! Static site, tunnel proxy and WebSocket tunnel behind a single port.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                     GATEWAY                          │
//!                     │                                                      │
//!   Client request    │  ┌──────────┐   ┌──────────┐   ┌─────────────────┐   │
//!   ──────────────────┼─▶│   net    │──▶│  http    │──▶│   dispatcher    │   │
//!                     │  │ listener │   │  server  │   │ (routing chain) │   │
//!                     │  └──────────┘   └──────────┘   └───────┬─────────┘   │
//!                     │                                        │             │
//!                     │             ┌──────────────────────────┼──────────┐  │
//!                     │             ▼                          ▼          ▼  │
//!                     │     ┌──────────────┐   ┌──────────────────┐ ┌──────┐ │
//!                     │     │ tunnel proxy │   │ websocket tunnel │ │ app  │ │
//!                     │     │  (/bear/)    │   │ (…/wisp/ upgrade)│ │server│ │
//!                     │     └──────┬───────┘   └────────┬─────────┘ └──────┘ │
//!                     └────────────┼────────────────────┼────────────────────┘
//!                                  ▼                    ▼
//!                           tunnel service       tunnel service
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use doge_gateway::config::{load_config, validate_config, ConfigError, GatewayConfig};
use doge_gateway::lifecycle::{signals, startup, Shutdown};
use doge_gateway::net::Listener;
use doge_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "doge-gateway", version)]
#[command(about = "Static site, tunnel proxy and WebSocket tunnel on one port", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overrides listener.bind_address.
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Port, keeps the configured host.
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level, overrides observability.log_level.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<GatewayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => GatewayConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.listener.bind_address = bind.to_string();
        }
        if let Some(port) = self.port {
            let mut addr: SocketAddr = config
                .listener
                .bind_address
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], port)));
            addr.set_port(port);
            config.listener.bind_address = addr.to_string();
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        static_dir = %config.assets.static_dir.display(),
        routes = config.routes.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let server = startup::build(&config)?;
    let listener = Listener::bind(&config.listener).await?;
    startup::log_banner(listener.local_addr()?);

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(Arc::clone(&shutdown));

    server.run(listener, server_shutdown).await?;

    tracing::info!("Doge gateway has been closed");
    Ok(())
}
