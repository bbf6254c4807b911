//! Application assembly: a router wrapped in middleware layers.

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::middleware::Middleware;
use crate::request::Request;
use crate::router::Router;

/// A router plus its middleware stack, ready to serve.
///
/// Layers are applied inside-out: the first [`layer`](App::layer) call sits
/// closest to the router, the last sits outermost and sees each request
/// first.
///
/// ```rust,no_run
/// use verso::{App, Router, Server, Versioner};
///
/// # async fn run(router: Router) -> Result<(), verso::Error> {
/// let app = App::new(router)
///     .layer(Versioner::new().versions(["v1", "v2"]));
///
/// Server::bind("0.0.0.0:3000").serve(app).await
/// # }
/// ```
pub struct App {
    root: BoxedHandler,
}

impl App {
    /// Starts a middleware chain terminating in `router`.
    ///
    /// Requests no route matches resolve to `404` inside the router link.
    pub fn new(router: Router) -> Self {
        Self { root: router.into_handler() }
    }

    /// Wraps the chain built so far in one more layer.
    pub fn layer(self, middleware: impl Middleware) -> Self {
        Self { root: middleware.wrap(self.root) }
    }

    /// Runs one request through the full chain.
    pub(crate) fn call(&self, req: Request) -> BoxFuture {
        self.root.call(req)
    }
}

impl From<Router> for App {
    fn from(router: Router) -> Self {
        Self::new(router)
    }
}
