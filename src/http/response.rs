//! Response under construction.
//!
//! # Responsibilities
//! - Collect status, headers and body written by layers and routes
//! - Turn the collected parts into an axum `Response` once the app is done
//!
//! # Design Decisions
//! - Writes append; nothing is flushed until the request is finished
//! - Header errors are reported, not silently dropped

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use serde::Serialize;

use crate::error::{Error, Result};

/// Mutable response handed to every callback through the context.
#[derive(Debug, Default)]
pub struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status code.
    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Insert a header, replacing any previous value.
    pub fn header(&mut self, name: &str, value: &str) -> Result<&mut Self> {
        let name = HeaderName::try_from(name).map_err(|_| Error::InvalidHeader(name.to_string()))?;
        let value = HeaderValue::try_from(value)
            .map_err(|_| Error::InvalidHeader(name.as_str().to_string()))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Append raw bytes to the body.
    pub fn write(&mut self, chunk: &[u8]) -> &mut Self {
        self.body.extend_from_slice(chunk);
        self
    }

    /// Append text to the body.
    pub fn write_str(&mut self, chunk: &str) -> &mut Self {
        self.write(chunk.as_bytes())
    }

    /// Replace the body with `value` serialized as JSON.
    pub fn json<T: Serialize>(&mut self, value: &T) -> Result<&mut Self> {
        self.body = serde_json::to_vec(value)?;
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(self)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Finish the reply.
    pub fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(Bytes::from(self.body)));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
