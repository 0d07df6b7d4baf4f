//! Request-time route dispatch.
//!
//! # Responsibilities
//! - Evaluate `on`, `group` and `vhost` declarations against the in-flight request
//! - Invoke the handler of every declaration that matches
//! - Carry the active path prefix into nested groups
//!
//! # Design Decisions
//! - No route table: each declaration runs the moment it is made
//! - Every match fires; there is no first-match-wins
//! - The prefix is a value owned by each `Router`. A group hands its handler
//!   a new `Router`, so the parent's prefix cannot be left modified, even
//!   when the handler fails
//! - Handler errors propagate to the caller unchanged

use tracing::debug;

use crate::error::{Error, HandlerResult, Result};
use crate::http::context::Context;
use crate::observability::metrics;
use crate::routing::matcher::{self, Captures, MethodMatch, PathMatch};

/// Root prefix of every request.
pub const ROOT_PREFIX: &str = "/";

/// Route declarations bound to one request and one path scope.
#[derive(Debug)]
pub struct Router<'a> {
    ctx: &'a mut Context,
    prefix: String,
    method_match: MethodMatch,
}

impl<'a> Router<'a> {
    /// Create a root router over `ctx`.
    pub fn new(ctx: &'a mut Context, method_match: MethodMatch) -> Self {
        Self {
            ctx,
            prefix: ROOT_PREFIX.to_string(),
            method_match,
        }
    }

    /// Active path prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn method_match(&self) -> MethodMatch {
        self.method_match
    }

    /// The request this router dispatches.
    pub fn context(&mut self) -> &mut Context {
        self.ctx
    }

    /// Match `pattern` under the active prefix against the request path.
    pub fn matches(&self, pattern: &str, strict: bool) -> Result<PathMatch> {
        matcher::match_path(&self.prefix, pattern, self.ctx.path(), strict)
    }

    /// Run `handler` if the request hostname matches `host`.
    ///
    /// `host` is a regex anchored at both ends. The handler gets this same
    /// router, so routes can be declared per host.
    pub fn vhost<F>(&mut self, host: &str, handler: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Router<'_>, &Captures) -> HandlerResult,
    {
        if let Some(captures) = matcher::match_host(host, self.ctx.hostname())? {
            debug!(host = %host, hostname = %self.ctx.hostname(), "Virtual host matched");
            metrics::record_route_match("vhost");
            handler(&mut *self, &captures).map_err(Error::handler)?;
        }
        Ok(self)
    }

    /// Run `handler` if the request matches `route` exactly.
    ///
    /// `route` is `"[METHOD ]pattern"`. Without a method token the route
    /// accepts the current request method.
    pub fn on<F>(&mut self, route: &str, handler: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Context, &Captures) -> HandlerResult,
    {
        let (token, pattern) = matcher::split_route(route, self.ctx.method());
        let matched = self.matches(pattern, true)?;

        if let Some(captures) = matched.captures {
            if self.method_match.accepts(&token, self.ctx.method()) {
                debug!(
                    method = %self.ctx.method(),
                    path = %self.ctx.path(),
                    route = %matched.pattern,
                    "Route matched"
                );
                metrics::record_route_match("on");
                handler(&mut *self.ctx, &captures).map_err(Error::handler)?;
            }
        }
        Ok(self)
    }

    /// Run `handler` with a nested router if the request path starts with
    /// `pattern` under the active prefix.
    pub fn group<F>(&mut self, pattern: &str, handler: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Router<'_>, &Captures) -> HandlerResult,
    {
        let matched = self.matches(pattern, false)?;

        if let Some(captures) = matched.captures {
            debug!(prefix = %matched.path, path = %self.ctx.path(), "Group matched");
            metrics::record_route_match("group");

            let mut nested = Router {
                ctx: &mut *self.ctx,
                prefix: matched.path,
                method_match: self.method_match,
            };
            handler(&mut nested, &captures).map_err(Error::handler)?;
        }
        Ok(self)
    }
}
