//! Request middleware.
//!
//! Layers run unconditionally, in bind order, before the terminal app.

pub mod layers;

pub use layers::Layers;
