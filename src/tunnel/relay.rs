//! Relay to an external tunnel service.
//!
//! # Responsibilities
//! - Forward plain requests over a pooled client
//! - Forward upgrade handshakes over a dedicated HTTP/1.1 connection
//! - Splice client and upstream streams once both sides switched protocols
//! - Map upstream failures to 502 Bad Gateway

use std::str::FromStr;
use std::time::Duration;

use axum::body::Body;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{Request, Response, StatusCode, Uri, Version};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio::io::copy_bidirectional;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::http::response::plain;
use crate::http::websocket::UpgradeEvent;

pub const UPSTREAM_UNAVAILABLE: &str = "Tunnel upstream unavailable";

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("invalid upstream address {0:?}")]
    InvalidUpstream(String),
    #[error("upstream connect failed: {0}")]
    Connect(#[from] std::io::Error),
    #[error("upstream connect timed out")]
    ConnectTimeout,
    #[error("upstream exchange failed: {0}")]
    Http(#[from] hyper::Error),
    #[error("upstream request failed: {0}")]
    Client(#[from] hyper_util::client::legacy::Error),
    #[error("invalid upstream uri: {0}")]
    Uri(#[from] axum::http::uri::InvalidUriParts),
}

/// Connection details for one tunnel service.
#[derive(Clone)]
pub struct UpstreamRelay {
    name: &'static str,
    authority: Authority,
    client: Client<HttpConnector, Body>,
    connect_timeout: Duration,
}

impl UpstreamRelay {
    pub fn new(
        name: &'static str,
        upstream: &str,
        connect_timeout: Duration,
    ) -> Result<Self, RelayError> {
        let authority = Authority::from_str(upstream)
            .map_err(|_| RelayError::InvalidUpstream(upstream.to_string()))?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            name,
            authority,
            client,
            connect_timeout,
        })
    }

    /// Forward a plain request and stream the upstream response back.
    pub async fn forward(&self, req: Request<Body>) -> Response<Body> {
        match self.try_forward(req).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(tunnel = self.name, upstream = %self.authority, %error, "Tunnel request failed");
                plain(StatusCode::BAD_GATEWAY, UPSTREAM_UNAVAILABLE)
            }
        }
    }

    async fn try_forward(&self, req: Request<Body>) -> Result<Response<Body>, RelayError> {
        let (mut parts, body) = req.into_parts();

        let mut uri_parts = parts.uri.clone().into_parts();
        uri_parts.scheme = Some(Scheme::HTTP);
        uri_parts.authority = Some(self.authority.clone());
        if uri_parts.path_and_query.is_none() {
            uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        parts.uri = Uri::from_parts(uri_parts)?;
        // The upstream leg is always HTTP/1.1, whatever the client spoke.
        parts.version = Version::HTTP_11;

        let response = self.client.request(Request::from_parts(parts, body)).await?;
        Ok(response.map(Body::new))
    }

    /// Forward an upgrade handshake. On `101 Switching Protocols` the client
    /// socket and the upstream connection are spliced until either side closes.
    pub async fn upgrade(&self, event: UpgradeEvent) -> Response<Body> {
        match self.try_upgrade(event).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(tunnel = self.name, upstream = %self.authority, %error, "Tunnel upgrade failed");
                plain(StatusCode::BAD_GATEWAY, UPSTREAM_UNAVAILABLE)
            }
        }
    }

    async fn try_upgrade(&self, event: UpgradeEvent) -> Result<Response<Body>, RelayError> {
        let (request, client_socket) = event.into_parts();

        let stream = timeout(self.connect_timeout, TcpStream::connect(self.authority.as_str()))
            .await
            .map_err(|_| RelayError::ConnectTimeout)??;
        if let Err(error) = stream.set_nodelay(true) {
            tracing::debug!(%error, "Error setting nodelay");
        }

        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;
        let name = self.name;
        tokio::spawn(async move {
            if let Err(error) = conn.with_upgrades().await {
                tracing::debug!(tunnel = name, %error, "Upstream connection closed with error");
            }
        });

        // Origin-form URI on a direct connection.
        let (mut parts, body) = request.into_parts();
        let mut uri_parts = parts.uri.clone().into_parts();
        uri_parts.scheme = None;
        uri_parts.authority = None;
        parts.uri = Uri::from_parts(uri_parts)?;

        let mut response = sender.send_request(Request::from_parts(parts, body)).await?;

        if response.status() == StatusCode::SWITCHING_PROTOCOLS {
            let upstream_socket = hyper::upgrade::on(&mut response);
            tokio::spawn(async move {
                let (client, upstream) = match tokio::try_join!(client_socket, upstream_socket) {
                    Ok(pair) => pair,
                    Err(error) => {
                        tracing::warn!(tunnel = name, %error, "Protocol switch failed");
                        return;
                    }
                };
                let mut client = TokioIo::new(client);
                let mut upstream = TokioIo::new(upstream);
                match copy_bidirectional(&mut client, &mut upstream).await {
                    Ok((sent, received)) => {
                        tracing::debug!(tunnel = name, sent, received, "Tunnel stream closed");
                    }
                    Err(error) => {
                        tracing::debug!(tunnel = name, %error, "Tunnel stream aborted");
                    }
                }
            });
        } else {
            tracing::debug!(tunnel = name, status = %response.status(), "Upstream declined upgrade");
        }

        Ok(response.map(Body::new))
    }
}
