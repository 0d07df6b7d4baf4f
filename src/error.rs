//! Error types shared by the router, the layer chain and the composition.
//!
//! Non-matching routes are never errors. Everything here is a real failure:
//! a pattern that does not compile, a callback that gave up, or a request
//! body that could not be drained.

use std::time::Duration;
use thiserror::Error;

/// Boxed error returned by user callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Return type of every route, group, vhost, layer and app callback.
pub type HandlerResult = Result<(), BoxError>;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while routing or running a request.
#[derive(Debug, Error)]
pub enum Error {
    /// A route, group or vhost pattern is not a valid regular expression.
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A user callback failed.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),

    /// A reply header name or value was rejected.
    #[error("invalid header `{0}`")]
    InvalidHeader(String),

    /// A JSON reply could not be serialized.
    #[error("failed to serialize reply: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading the request body failed.
    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),

    /// The request body did not complete in time.
    #[error("request body not complete after {0:?}")]
    BodyTimeout(Duration),

    /// The body drain was cancelled before completion.
    #[error("request cancelled before the body completed")]
    Cancelled,
}

impl Error {
    /// Wrap a failed callback.
    pub(crate) fn handler(err: BoxError) -> Self {
        // Callbacks may bubble a routing error back up through `?`; keep it as is.
        match err.downcast::<Error>() {
            Ok(inner) => *inner,
            Err(other) => Error::Handler(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_unwraps_nested_error() {
        let nested: BoxError = Box::new(Error::Cancelled);
        assert!(matches!(Error::handler(nested), Error::Cancelled));

        let foreign: BoxError = "boom".into();
        let err = Error::handler(foreign);
        assert!(matches!(err, Error::Handler(_)));
        assert_eq!(err.to_string(), "handler failed: boom");
    }

    #[test]
    fn test_invalid_pattern_message() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = Error::InvalidPattern { pattern: "(".into(), source };
        assert!(err.to_string().starts_with("invalid pattern `(`"));
    }
}
