//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Context (method, hostname, path)
//!     → router.rs (on / group / vhost declarations)
//!     → matcher.rs (prefix + pattern → anchored regex, captures)
//!     → matching handlers invoked in declaration order
//! ```
//!
//! # Design Decisions
//! - Routes are evaluated when declared, against one request; nothing is stored
//! - Patterns are regular expressions; captures are passed positionally
//! - Every matching declaration fires (no first-match-wins)
//! - Nested groups receive their prefix by value

pub mod matcher;
pub mod router;

pub use matcher::{Captures, MethodMatch, PathMatch};
pub use router::Router;
