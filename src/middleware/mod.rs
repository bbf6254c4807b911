//! Middleware layer.
//!
//! Middleware intercepts requests before they reach the router and is the
//! right place for cross-cutting concerns. A layer owns the next handler in
//! the chain and decides, per request, whether to invoke it:
//!
//! - annotate the request context and forward, or
//! - short-circuit with a response of its own (the versioner's 404).
//!
//! Layers are applied with [`App::layer`](crate::App::layer); the last layer
//! added sits outermost and sees the request first.

pub mod versioner;

pub use versioner::{VersionNotAllowed, Versioner};

use crate::handler::BoxedHandler;

/// A processing layer wrapped around a downstream handler.
///
/// `wrap` consumes the layer's configuration and the rest of the chain,
/// producing the combined handler. Configuration is therefore fixed at
/// construction time — nothing about a layer mutates once it serves traffic.
pub trait Middleware {
    fn wrap(self, next: BoxedHandler) -> BoxedHandler;
}
