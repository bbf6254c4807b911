//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup via [`matchit`]. The
//! router never inspects or rewrites the path — middleware upstream of it
//! (the versioner included) sees the exact path the client sent.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; hand it to [`App::new`](crate::App). Each
/// [`Router::on`] call returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use http::Method;
    /// # use verso::{Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/v1/users/{id}", get_user)
    ///     .on(Method::POST, "/v1/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics at startup if `path` is not a valid route pattern.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Converts the router into a chain-terminal handler.
    ///
    /// Unmatched routes resolve to `404 Not Found` here, so middleware
    /// wrapped around the result never has to special-case routing misses.
    pub(crate) fn into_handler(self) -> BoxedHandler {
        Arc::new(RouteDispatch(self))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// The innermost link of every middleware chain: resolves the route and
/// invokes the matched handler.
struct RouteDispatch(Router);

impl ErasedHandler for RouteDispatch {
    fn call(&self, mut req: Request) -> BoxFuture {
        match self.0.lookup(req.method(), req.path()) {
            Some((handler, params)) => {
                req.set_params(params);
                handler.call(req)
            }
            None => Box::pin(async { Response::status(StatusCode::NOT_FOUND) }),
        }
    }
}
