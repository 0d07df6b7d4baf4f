//! HTTP server setup.
//!
//! # Responsibilities
//! - Mount a per-request routing function on an axum service
//! - Wire up middleware (request ID, tracing, timeout)
//! - Build a fresh `Horus` for every request
//! - Map routing failures to 500 responses
//! - Serve until the shutdown signal fires

use std::future::Future;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::app::{Horus, RunOptions};
use crate::config::HorusConfig;
use crate::error::Result;
use crate::http::request::UuidRequestId;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// HTTP server dispatching every request through a routing function.
pub struct HttpServer {
    router: Router,
    config: HorusConfig,
}

impl HttpServer {
    /// Create a server calling `handler` with a fresh `Horus` per request.
    pub fn new<H, Fut>(config: HorusConfig, handler: H) -> Self
    where
        H: Fn(Horus<'static>) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<Response>> + Send + 'static,
    {
        let router = Self::build_router(&config, handler);
        Self { router, config }
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router<H, Fut>(config: &HorusConfig, handler: H) -> Router
    where
        H: Fn(Horus<'static>) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<Response>> + Send + 'static,
    {
        let options = RunOptions::from(&config.routing);

        Router::new()
            .fallback(move |request: Request<Body>| dispatch(handler.clone(), options, request))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.routing.request_timeout_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The assembled axum router, e.g. for `tower::ServiceExt::oneshot`.
    pub fn into_router(self) -> Router {
        self.router
    }

    pub fn config(&self) -> &HorusConfig {
        &self.config
    }

    /// Accept connections on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown.signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn dispatch<H, Fut>(handler: H, options: RunOptions, request: Request<Body>) -> Response
where
    H: Fn(Horus<'static>) -> Fut,
    Fut: Future<Output = Result<Response>>,
{
    let start = Instant::now();
    let horus = Horus::with_options(request, options);
    let method = horus.facts().method.clone();

    let response = match handler(horus).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(method = %method, error = %e, "Request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    };

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
