//! Horus: a per-request HTTP router and middleware chain for axum.
//!
//! Every request gets its own [`Horus`]. Route declarations run against
//! that request the moment they are made, layers run in bind order, and the
//! terminal app runs once the body has been read to completion.
//!
//! ```no_run
//! use axum::{body::Body, http::Request, response::Response};
//! use horus::Horus;
//!
//! async fn handle(request: Request<Body>) -> horus::Result<Response> {
//!     let mut horus = Horus::new(request);
//!     horus.layers().bind(|ctx| {
//!         ctx.reply().header("x-powered-by", "horus")?;
//!         Ok(())
//!     });
//!     horus
//!         .router()
//!         .group("api", |api, _| {
//!             api.on("GET users/(\\d+)", |ctx, caps| {
//!                 ctx.reply().write_str(caps.get(0).unwrap_or_default());
//!                 Ok(())
//!             })?;
//!             Ok(())
//!         })?;
//!     horus.run(|_| Ok(())).await
//! }
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use app::{factory, Horus, RunOptions};
pub use config::HorusConfig;
pub use error::{BoxError, Error, HandlerResult, Result};
pub use http::{Context, HttpServer, Reply};
pub use lifecycle::Shutdown;
pub use routing::{Captures, MethodMatch, Router};
