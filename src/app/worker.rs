//! Remote worker script proxy.
//!
//! Fetches the script from its remote home on every request and re-serves it
//! as JavaScript. Any failure upstream becomes a generic 500.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::config::WorkerScriptConfig;
use crate::observability::metrics;

pub const WORKER_FETCH_ERROR: &str = "Error fetching worker script";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream answered {0}")]
    Status(reqwest::StatusCode),
}

/// Client for the remote worker script.
#[derive(Clone)]
pub struct WorkerScript {
    client: reqwest::Client,
    url: Arc<str>,
}

impl WorkerScript {
    pub fn from_config(config: &WorkerScriptConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: Arc::from(config.url.as_str()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the script body. Only a 200 counts as success.
    pub async fn fetch(&self) -> Result<Bytes, FetchError> {
        let response = self.client.get(self.url()).send().await?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(FetchError::Status(response.status()));
        }
        Ok(response.bytes().await?)
    }
}

/// Handler for the worker script path.
pub async fn serve_worker_script(State(script): State<WorkerScript>) -> Response {
    match script.fetch().await {
        Ok(body) => {
            metrics::record_worker_fetch("ok");
            ([(header::CONTENT_TYPE, "text/javascript")], body).into_response()
        }
        Err(error) => {
            metrics::record_worker_fetch("error");
            tracing::warn!(url = script.url(), %error, "Failed to fetch worker script");
            (StatusCode::INTERNAL_SERVER_ERROR, WORKER_FETCH_ERROR).into_response()
        }
    }
}
