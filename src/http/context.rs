//! Request-scoped context.
//!
//! One `Context` is built per inbound request and handed to every layer,
//! route and the terminal app. It is never shared between requests.

use axum::body::Bytes;
use axum::http::{request::Parts, Extensions, HeaderMap, Method, Uri};

use crate::http::request::{RequestFacts, X_REQUEST_ID};
use crate::http::response::Reply;

/// Everything a callback may read or write for the in-flight request.
#[derive(Debug)]
pub struct Context {
    head: Parts,
    facts: RequestFacts,
    reply: Reply,
    body: Option<Bytes>,
    locals: Extensions,
}

impl Context {
    /// Build a context from a request head.
    pub fn new(head: Parts) -> Self {
        let facts = RequestFacts::from_parts(&head);
        Self {
            head,
            facts,
            reply: Reply::new(),
            body: None,
            locals: Extensions::new(),
        }
    }

    /// Normalized method, hostname and path.
    pub fn facts(&self) -> &RequestFacts {
        &self.facts
    }

    pub fn method(&self) -> &str {
        &self.facts.method
    }

    pub fn hostname(&self) -> &str {
        &self.facts.hostname
    }

    pub fn path(&self) -> &str {
        &self.facts.path
    }

    /// The method as received.
    pub fn raw_method(&self) -> &Method {
        &self.head.method
    }

    pub fn uri(&self) -> &Uri {
        &self.head.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    /// Extensions set by the host (request ID, connect info, ...).
    pub fn extensions(&self) -> &Extensions {
        &self.head.extensions
    }

    /// The `x-request-id` header, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.head
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
    }

    /// Typed values layers leave for later callbacks.
    pub fn locals(&self) -> &Extensions {
        &self.locals
    }

    pub fn locals_mut(&mut self) -> &mut Extensions {
        &mut self.locals
    }

    pub fn reply(&mut self) -> &mut Reply {
        &mut self.reply
    }

    /// Raw request body; `None` until the body has been drained.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub(crate) fn set_body(&mut self, body: Bytes) {
        self.body = Some(body);
    }

    pub(crate) fn into_reply(self) -> Reply {
        self.reply
    }
}
