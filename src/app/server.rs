//! Application server setup.
//!
//! # Responsibilities
//! - Exact-path pages from the route table
//! - Fixed redirects and the worker script proxy
//! - Vendor asset mounts and the static directory
//! - 404 with the not-found page for everything else
//!
//! # Design Decisions
//! - Terminal fallback for the whole gateway: anything no tunnel claimed
//!   ends here, and the 404 page is the system-wide catch-all
//! - Timeout and tracing layers wrap this router only, never classification

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::handler::Handler;
use axum::http::{header, Request, Response, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, get_service};
use axum::Router;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app::worker::{serve_worker_script, WorkerScript};
use crate::config::GatewayConfig;
use crate::routing::table::RouteTable;

/// Static pages, redirects and the worker proxy behind one router.
#[derive(Clone)]
pub struct AppServer {
    router: Router,
}

impl AppServer {
    /// Build the stock application router from configuration.
    pub fn from_config(
        config: &GatewayConfig,
        routes: &RouteTable,
        worker: WorkerScript,
    ) -> Self {
        Self::from_router(build_router(config, routes, worker))
    }

    /// Wrap an arbitrary router, e.g. a stand-in during tests.
    pub fn from_router(router: Router) -> Self {
        Self { router }
    }

    /// Serve one request to completion.
    pub async fn serve(&self, req: Request<Body>) -> Response<Body> {
        match self.router.clone().oneshot(req).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
fn build_router(config: &GatewayConfig, routes: &RouteTable, worker: WorkerScript) -> Router {
    let not_found = serve_not_found_page.with_state(Arc::new(config.assets.not_found_path()));

    let mut router = Router::new();

    for entry in routes.entries() {
        router = router.route(
            entry.path(),
            get_service(ServeFile::new(entry.asset())).fallback_service(not_found.clone()),
        );
    }

    for redirect in &config.redirects {
        let location = redirect.to.clone();
        router = router.route(
            &redirect.from,
            get(move || found(location.clone())).fallback_service(not_found.clone()),
        );
    }

    router = router.route(
        &config.worker.path,
        get(serve_worker_script)
            .with_state(worker)
            .fallback_service(not_found.clone()),
    );

    for mount in &config.mounts {
        let prefix = mount.prefix.trim_end_matches('/');
        router = router.nest_service(
            prefix,
            ServeDir::new(&mount.dir)
                .call_fallback_on_method_not_allowed(true)
                .fallback(not_found.clone()),
        );
    }

    router
        .fallback_service(
            ServeDir::new(&config.assets.static_dir)
                .call_fallback_on_method_not_allowed(true)
                .fallback(not_found),
        )
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(TraceLayer::new_for_http())
}

/// The not-found page with a 404 status, whatever the method.
async fn serve_not_found_page(State(page): State<Arc<PathBuf>>) -> Response<Body> {
    match tokio::fs::read(page.as_path()).await {
        Ok(bytes) => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            bytes,
        )
            .into_response(),
        Err(error) => {
            tracing::warn!(page = %page.display(), %error, "Not-found page unreadable");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// 302 Found with the given location.
async fn found(location: String) -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, location)])
}
