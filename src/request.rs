//! Incoming HTTP request context.
//!
//! A [`Request`] carries the parsed request plus a string-keyed **context
//! map** shared along the middleware chain. Middleware annotates the map;
//! handlers read it. The path string itself is never rewritten by anything
//! in this crate — annotations go in the context, not the URL.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method};

/// Context key under which the extracted API version is stored.
///
/// Read it with [`Request::version`] rather than spelling the key out.
pub const API_VERSION: &str = "verso.api.version";

/// An incoming HTTP request, plus the per-request context map.
///
/// Created once per request at the server edge and handed through the
/// middleware chain by value. Each request owns its own context — nothing
/// here is shared across concurrent requests.
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
    context: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: impl Into<String>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            headers,
            body,
            params: HashMap::new(),
            context: HashMap::new(),
        }
    }

    /// Builds a request from hyper request parts and a collected body.
    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        Self::new(parts.method, parts.uri.path(), parts.headers, body)
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Non-UTF-8 values read as `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    /// Reads a context entry set by upstream middleware.
    pub fn context(&self, key: &str) -> Option<&str> {
        self.context.get(key).map(String::as_str)
    }

    /// Writes a context entry for downstream handlers. Overwrites any
    /// previous value under the same key.
    pub fn set_context(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.context.insert(key.into(), value.into());
    }

    /// The API version extracted from the request path, if any.
    ///
    /// `None` when no versioning middleware ran, or when the path carried
    /// no version segment.
    pub fn version(&self) -> Option<&str> {
        self.context(API_VERSION)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::{HeaderMap, HeaderValue, Method};

    use super::{API_VERSION, Request};

    fn request(path: &str) -> Request {
        Request::new(Method::GET, path, HeaderMap::new(), Bytes::new())
    }

    #[test]
    fn context_round_trips_and_overwrites() {
        let mut req = request("/v1/x");
        assert_eq!(req.context("k"), None);

        req.set_context("k", "a");
        assert_eq!(req.context("k"), Some("a"));

        req.set_context("k", "b");
        assert_eq!(req.context("k"), Some("b"));
    }

    #[test]
    fn version_reads_the_reserved_key() {
        let mut req = request("/v2/x");
        assert_eq!(req.version(), None);

        req.set_context(API_VERSION, "v2");
        assert_eq!(req.version(), Some("v2"));
        assert_eq!(req.path(), "/v2/x");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        let req = Request::new(Method::POST, "/v1/users", headers, Bytes::new());

        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.header("x-missing"), None);
    }
}
