//! HTTP-facing subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, request ID, tracing, timeout)
//!     → request.rs (normalize method, hostname, path)
//!     → context.rs (request-scoped state handed to every callback)
//!     → middleware/ (layer chain)
//!     → [routing declarations fire against the context]
//!     → response.rs (collected reply → axum Response)
//!     → Send to client
//! ```

pub mod context;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use context::Context;
pub use request::{RequestFacts, UuidRequestId, X_REQUEST_ID};
pub use response::Reply;
pub use server::HttpServer;
