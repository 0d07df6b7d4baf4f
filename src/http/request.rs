//! Request normalization and identification.
//!
//! # Responsibilities
//! - Derive the routing facts (method, hostname, path) from a raw request
//! - Generate a unique request ID for tracing
//!
//! # Design Decisions
//! - Facts are derived once per request and never change afterwards
//! - No validation: a missing or odd Host header just yields an odd hostname
//! - Percent-encoding is left untouched; patterns see the raw request-target

use axum::http::{header, request::Parts, HeaderMap, HeaderValue, Method, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Normalized routing facts for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFacts {
    /// Uppercased HTTP method.
    pub method: String,
    /// Host header up to the first colon.
    pub hostname: String,
    /// Request path with query dropped, slashes collapsed and a slash at each end.
    pub path: String,
}

impl RequestFacts {
    /// Derive the facts from a full request.
    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self::derive(req.method(), req.uri(), req.headers())
    }

    /// Derive the facts from a request head.
    pub fn from_parts(head: &Parts) -> Self {
        Self::derive(&head.method, &head.uri, &head.headers)
    }

    fn derive(method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        // HTTP/2 carries the authority in the URI rather than a Host header.
        let host = headers
            .get(header::HOST)
            .map(|h| h.to_str().unwrap_or_default())
            .or_else(|| uri.host())
            .unwrap_or_default();

        let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

        Self {
            method: normalize_method(method.as_str()),
            hostname: hostname_from_host(host).to_string(),
            path: normalize_path(target),
        }
    }
}

/// Uppercase an HTTP method.
pub fn normalize_method(method: &str) -> String {
    method.to_ascii_uppercase()
}

/// Everything before the first `:` of a Host header value.
pub fn hostname_from_host(host: &str) -> &str {
    host.split(':').next().unwrap_or_default()
}

/// Drop the query string, wrap in slashes and collapse every run of `/`.
pub fn normalize_path(url: &str) -> String {
    let path = url.split('?').next().unwrap_or_default();
    collapse_slashes(&format!("/{}/", path))
}

/// Replace every run of `/` with a single `/`.
pub fn collapse_slashes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous_slash = false;
    for c in input.chars() {
        if c == '/' {
            if !previous_slash {
                out.push(c);
            }
            previous_slash = true;
        } else {
            out.push(c);
            previous_slash = false;
        }
    }
    out
}

/// Generates a UUID v4 for every request lacking an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}
