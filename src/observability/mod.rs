//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router / layers / server produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout (human or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the trace layer into every log line
//! - Metric updates are cheap no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
