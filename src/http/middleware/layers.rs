//! Ordered middleware chain.
//!
//! # Responsibilities
//! - Collect layer callbacks in registration order
//! - Run every layer once against the request context
//!
//! # Design Decisions
//! - No isolation: the first failing layer stops the chain and the request
//! - Layers cannot be removed once bound
//! - Layers may borrow from the caller for `'a`, like route handlers do

use std::fmt;

use tracing::debug;

use crate::error::{Error, HandlerResult, Result};
use crate::http::context::Context;

type Layer<'a> = Box<dyn FnMut(&mut Context) -> HandlerResult + Send + 'a>;

/// Middleware callbacks run before the terminal app.
#[derive(Default)]
pub struct Layers<'a> {
    layers: Vec<Layer<'a>>,
}

impl<'a> Layers<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer.
    pub fn bind<F>(&mut self, layer: F) -> &mut Self
    where
        F: FnMut(&mut Context) -> HandlerResult + Send + 'a,
    {
        self.layers.push(Box::new(layer));
        self
    }

    /// Run every layer in insertion order.
    pub fn trigger(&mut self, ctx: &mut Context) -> Result<()> {
        for (index, layer) in self.layers.iter_mut().enumerate() {
            layer(ctx).map_err(|e| {
                debug!(layer = index, error = %e, "Layer failed");
                Error::handler(e)
            })?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl fmt::Debug for Layers<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layers")
            .field("len", &self.layers.len())
            .finish()
    }
}
