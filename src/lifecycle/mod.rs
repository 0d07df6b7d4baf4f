//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → server stops accepting, drains in-flight requests
//!             → pending body drains observe the signal and cancel
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
