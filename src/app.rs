//! Per-request composition of router, layers and the terminal app.
//!
//! # Data Flow
//! ```text
//! Request<Body>
//!     → Horus::new (normalize method/hostname/path, build Context)
//!     → router() declarations fire immediately
//!     → run(app):
//!         layers.trigger()
//!         → drain body to completion (timeout, cancel)
//!         → keep it on the context unless it exceeded the limit
//!         → app(context)
//!     → Response
//! ```

use std::future::Future;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::Request;
use axum::response::Response;
use futures_util::StreamExt;
use tracing::debug;

use crate::config::RoutingConfig;
use crate::error::{Error, HandlerResult, Result};
use crate::http::context::Context;
use crate::http::middleware::Layers;
use crate::http::request::RequestFacts;
use crate::routing::{MethodMatch, Router};

/// Per-request knobs, usually taken from `RoutingConfig`.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub method_match: MethodMatch,
    /// Largest body kept on the context. Larger bodies are still read to
    /// the end, but discarded.
    pub body_limit: usize,
    pub body_timeout: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from(&RoutingConfig::default())
    }
}

impl From<&RoutingConfig> for RunOptions {
    fn from(config: &RoutingConfig) -> Self {
        Self {
            method_match: config.method_match,
            body_limit: config.body_limit_bytes,
            body_timeout: config.body_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Build the per-request object.
pub fn factory<'a>(request: Request<Body>) -> Horus<'a> {
    Horus::new(request)
}

/// Router, layers and body of one in-flight request.
///
/// `'a` bounds what bound layers may borrow; the request is dropped before
/// anything they borrow.
#[derive(Debug)]
pub struct Horus<'a> {
    ctx: Context,
    body: Body,
    layers: Layers<'a>,
    options: RunOptions,
}

impl<'a> Horus<'a> {
    pub fn new(request: Request<Body>) -> Self {
        Self::with_options(request, RunOptions::default())
    }

    pub fn with_options(request: Request<Body>, options: RunOptions) -> Self {
        let (head, body) = request.into_parts();
        Self {
            ctx: Context::new(head),
            body,
            layers: Layers::new(),
            options,
        }
    }

    /// Root router; declarations run against this request immediately.
    pub fn router(&mut self) -> Router<'_> {
        Router::new(&mut self.ctx, self.options.method_match)
    }

    pub fn layers(&mut self) -> &mut Layers<'a> {
        &mut self.layers
    }

    pub fn context(&mut self) -> &mut Context {
        &mut self.ctx
    }

    /// Normalized method, hostname and path of this request.
    pub fn facts(&self) -> &RequestFacts {
        self.ctx.facts()
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Trigger the layers, wait for the whole body, then call `app`.
    pub async fn run<F>(self, app: F) -> Result<Response>
    where
        F: FnOnce(&mut Context) -> HandlerResult,
    {
        self.run_until(app, std::future::pending()).await
    }

    /// Like [`run`](Self::run), but gives up with [`Error::Cancelled`] when
    /// `cancel` completes before the body does. `app` is not called then.
    ///
    /// A body over the limit still lets `app` run, with
    /// [`Context::body`] left `None`.
    pub async fn run_until<F, C>(self, app: F, cancel: C) -> Result<Response>
    where
        F: FnOnce(&mut Context) -> HandlerResult,
        C: Future<Output = ()>,
    {
        let Self {
            mut ctx,
            body,
            mut layers,
            options,
        } = self;

        layers.trigger(&mut ctx)?;

        let body = tokio::select! {
            biased;
            _ = cancel => {
                debug!(path = %ctx.path(), "Request cancelled before body completed");
                return Err(Error::Cancelled);
            }
            body = drain(body, &options) => body?,
        };
        match body {
            Some(body) => ctx.set_body(body),
            None => debug!(
                path = %ctx.path(),
                limit = options.body_limit,
                "Request body over limit, discarded"
            ),
        }

        app(&mut ctx).map_err(Error::handler)?;
        Ok(ctx.into_reply().into_response())
    }
}

async fn drain(body: Body, options: &RunOptions) -> Result<Option<Bytes>> {
    let read = collect(body, options.body_limit);
    match options.body_timeout {
        Some(limit) => tokio::time::timeout(limit, read)
            .await
            .map_err(|_| Error::BodyTimeout(limit))?,
        None => read.await,
    }
}

/// Read `body` to its end. Returns `None` if it grew past `limit`.
async fn collect(body: Body, limit: usize) -> Result<Option<Bytes>> {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();
    let mut over_limit = false;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(Error::Body)?;
        if over_limit {
            continue;
        }
        if buf.len() + chunk.len() > limit {
            over_limit = true;
            buf = Vec::new();
            continue;
        }
        buf.extend_from_slice(&chunk);
    }

    Ok((!over_limit).then(|| Bytes::from(buf)))
}
