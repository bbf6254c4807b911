//! Path-based API version extraction.
//!
//! [`Versioner`] reads the first path segment of each request, optionally
//! validates it, and publishes it to downstream handlers under the
//! [`API_VERSION`](crate::request::API_VERSION) context key. The request
//! path is left exactly as the client sent it — routes still match against
//! the full path, version segment included.
//!
//! | Config | Effect |
//! |---|---|
//! | *(none)* | any non-empty first segment becomes the version |
//! | `pattern` | segment must match the regex in full, else no version |
//! | `versions` | allow-list; unknown versions are rejected with `404` |
//! | `prefix` | stripped before extraction, when the path starts with it |
//! | `mount_path` | stripped before `prefix`, when the path starts with it |
//!
//! ```rust,no_run
//! use http::Method;
//! use verso::{App, Router, Versioner};
//!
//! let router = Router::new()
//!     .on(Method::GET, "/api/{version}/users", list_users);
//!
//! let app = App::new(router)
//!     .layer(Versioner::new().mount_path("/api").versions(["v1", "v2"]));
//! # async fn list_users(req: verso::Request) -> verso::Response {
//! #     verso::Response::text(req.version().unwrap_or("none").to_owned())
//! # }
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use regex::Regex;
use tracing::debug;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::middleware::Middleware;
use crate::request::{API_VERSION, Request};
use crate::response::Response;

// ── Rejection ─────────────────────────────────────────────────────────────────

/// An allow-list is configured and the extracted version is not in it.
///
/// This is the versioner's only failure mode. It aborts the chain — the
/// downstream handler is never invoked — and materialises as `404 Not
/// Found`. Everything else (no version segment, pattern mismatch, bare `/`)
/// resolves to an absent version and normal forwarding.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VersionNotAllowed {
    version: String,
}

impl VersionNotAllowed {
    /// The rejected version token.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The HTTP status this rejection maps to. Always `404`.
    pub fn status(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }
}

impl fmt::Display for VersionNotAllowed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "api version `{}` is not in the allow-list", self.version)
    }
}

impl std::error::Error for VersionNotAllowed {}

// ── Versioner ─────────────────────────────────────────────────────────────────

/// Middleware that extracts the API version from the first path segment.
///
/// All four knobs are optional and default to no-op. Allow-list entries are
/// normalised to plain strings here, at construction, so per-request
/// validation is a set lookup — no type games at request time.
#[derive(Clone, Debug, Default)]
pub struct Versioner {
    pattern: Option<Regex>,
    versions: Option<HashSet<String>>,
    prefix: Option<String>,
    mount_path: Option<String>,
}

impl Versioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the candidate segment to match `pattern` in full.
    ///
    /// A segment that fails the pattern is not a version — the request still
    /// forwards, with no version set. The pattern never causes a rejection.
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Restricts accepted versions to the given set.
    ///
    /// Once an allow-list is configured, a candidate segment outside it is a
    /// hard `404` — not a pass-through.
    pub fn versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versions = Some(versions.into_iter().map(Into::into).collect());
        self
    }

    /// Path prefix to skip before looking for the version segment.
    ///
    /// Only stripped when the request path actually starts with it; a
    /// non-matching prefix does not suppress extraction.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Mount point the whole application is nested under.
    ///
    /// Stripped before `prefix` when the path starts with it.
    pub fn mount_path(mut self, mount_path: impl Into<String>) -> Self {
        self.mount_path = Some(mount_path.into());
        self
    }

    /// Extracts the version token from `path` without touching it.
    ///
    /// Returns `Ok(Some(version))` on acceptance, `Ok(None)` when the path
    /// carries no version (empty path, bare `/`, or pattern mismatch), and
    /// `Err` only for an allow-list rejection.
    ///
    /// Pure over `(config, path)`: calling it twice on the same path yields
    /// the same answer both times.
    pub fn extract(&self, path: &str) -> Result<Option<String>, VersionNotAllowed> {
        let mut rest = path;
        if let Some(mount) = &self.mount_path {
            if let Some(stripped) = rest.strip_prefix(mount.as_str()) {
                rest = stripped;
            }
        }
        if let Some(prefix) = &self.prefix {
            if let Some(stripped) = rest.strip_prefix(prefix.as_str()) {
                rest = stripped;
            }
        }

        let candidate = rest
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default();
        if candidate.is_empty() {
            return Ok(None);
        }

        if let Some(pattern) = &self.pattern {
            let full_match = pattern
                .find(candidate)
                .is_some_and(|m| m.start() == 0 && m.end() == candidate.len());
            if !full_match {
                return Ok(None);
            }
        }

        if let Some(allowed) = &self.versions {
            if !allowed.contains(candidate) {
                return Err(VersionNotAllowed { version: candidate.to_owned() });
            }
        }

        Ok(Some(candidate.to_owned()))
    }
}

impl Middleware for Versioner {
    fn wrap(self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(VersionerLayer { config: self, next })
    }
}

// ── Chain link ────────────────────────────────────────────────────────────────

/// The versioner installed in a chain: config plus the downstream handler.
struct VersionerLayer {
    config: Versioner,
    next: BoxedHandler,
}

impl ErasedHandler for VersionerLayer {
    fn call(&self, mut req: Request) -> BoxFuture {
        match self.config.extract(req.path()) {
            Ok(Some(version)) => {
                debug!(%version, path = req.path(), "api version extracted");
                req.set_context(API_VERSION, version);
                self.next.call(req)
            }
            Ok(None) => self.next.call(req),
            Err(rejected) => {
                debug!(version = rejected.version(), path = req.path(), "api version rejected");
                let status = rejected.status();
                Box::pin(async move { Response::status(status) })
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use bytes::Bytes;
    use http::{HeaderMap, Method, StatusCode};
    use regex::Regex;

    use super::Versioner;
    use crate::handler::{ErasedHandler, Handler};
    use crate::middleware::Middleware;
    use crate::request::Request;
    use crate::response::Response;

    fn request(path: &str) -> Request {
        Request::new(Method::GET, path, HeaderMap::new(), Bytes::new())
    }

    fn v_pattern() -> Regex {
        Regex::new("(?i)v.").unwrap()
    }

    // ── extraction ────────────────────────────────────────────────────────────

    #[test]
    fn takes_the_first_path_segment() {
        let versioner = Versioner::new();
        assert_eq!(versioner.extract("/v1/awesome").unwrap().as_deref(), Some("v1"));
        assert_eq!(versioner.extract("/anything/else").unwrap().as_deref(), Some("anything"));
    }

    #[test]
    fn bare_slash_yields_no_version() {
        assert_eq!(Versioner::new().extract("/").unwrap(), None);
    }

    #[test]
    fn empty_path_yields_no_version() {
        assert_eq!(Versioner::new().extract("").unwrap(), None);
    }

    #[test]
    fn pattern_match_sets_the_version() {
        let versioner = Versioner::new().pattern(v_pattern());
        assert_eq!(versioner.extract("/v1/awesome").unwrap().as_deref(), Some("v1"));
    }

    #[test]
    fn pattern_mismatch_is_not_an_error() {
        let versioner = Versioner::new().pattern(v_pattern());
        assert_eq!(versioner.extract("/awesome/radical").unwrap(), None);
    }

    #[test]
    fn pattern_must_match_the_whole_segment() {
        // `v.` matches inside "av1z" but does not cover it.
        let versioner = Versioner::new().pattern(v_pattern());
        assert_eq!(versioner.extract("/av1z/foo").unwrap(), None);
    }

    #[test]
    fn allow_list_accepts_listed_versions() {
        let versioner = Versioner::new().versions(["v1", "v2"]);
        assert_eq!(versioner.extract("/v1/asoasd").unwrap().as_deref(), Some("v1"));
        assert_eq!(versioner.extract("/v2/asoasd").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn allow_list_rejects_unknown_versions_with_404() {
        let versioner = Versioner::new().versions(["v1", "v2"]);
        let rejected = versioner.extract("/v3/awesome").unwrap_err();
        assert_eq!(rejected.status(), StatusCode::NOT_FOUND);
        assert_eq!(rejected.version(), "v3");
    }

    #[test]
    fn allow_list_entries_normalise_to_strings() {
        // Mixed owned/borrowed entries land in the same set.
        let owned = Versioner::new().versions(vec![String::from("v1"), String::from("v2")]);
        let borrowed = Versioner::new().versions(["v1", "v2"]);
        for versioner in [owned, borrowed] {
            assert_eq!(versioner.extract("/v1/x").unwrap().as_deref(), Some("v1"));
            assert!(versioner.extract("/v3/x").is_err());
        }
    }

    #[test]
    fn pattern_mismatch_bypasses_the_allow_list() {
        // A segment that is not a version candidate cannot be rejected.
        let versioner = Versioner::new().pattern(v_pattern()).versions(["v1"]);
        assert_eq!(versioner.extract("/awesome/radical").unwrap(), None);
    }

    #[test]
    fn non_matching_prefix_does_not_suppress_detection() {
        let versioner = Versioner::new().prefix("/v1").pattern(v_pattern());
        assert_eq!(versioner.extract("/v3/foo").unwrap().as_deref(), Some("v3"));
    }

    #[test]
    fn matching_prefix_is_stripped_before_extraction() {
        let versioner = Versioner::new().prefix("/api").pattern(v_pattern());
        assert_eq!(versioner.extract("/api/v2/foo").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn mount_path_is_stripped_before_extraction() {
        let versioner = Versioner::new().mount_path("/mounted").versions(["v1"]);
        assert_eq!(versioner.extract("/mounted/v1/foo").unwrap().as_deref(), Some("v1"));
    }

    #[test]
    fn mount_path_then_prefix_strip_in_sequence() {
        let versioner = Versioner::new().mount_path("/mounted").prefix("/api");
        assert_eq!(versioner.extract("/mounted/api/v1/foo").unwrap().as_deref(), Some("v1"));
    }

    #[test]
    fn extraction_is_idempotent() {
        let versioner = Versioner::new().versions(["v1"]);
        let path = "/v1/foo";
        assert_eq!(versioner.extract(path).unwrap(), versioner.extract(path).unwrap());
    }

    #[test]
    fn rejection_formats_and_compares() {
        let versioner = Versioner::new().versions(["v1"]);
        let rejected = versioner.extract("/v9/x").unwrap_err();
        assert_eq!(rejected.to_string(), "api version `v9` is not in the allow-list");
        assert_eq!(rejected, versioner.extract("/v9/y").unwrap_err());
        let _: &dyn std::error::Error = &rejected;
    }

    // ── chain behaviour ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn forwards_with_version_in_context_and_path_untouched() {
        let next = (|req: Request| async move {
            assert_eq!(req.path(), "/v1/awesome");
            Response::text(req.version().unwrap_or("none").to_owned())
        })
        .into_boxed_handler();
        let handler = Versioner::new().wrap(next);

        let response = handler.call(request("/v1/awesome")).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.body(), b"v1");
    }

    #[tokio::test]
    async fn forwards_without_version_on_bare_slash() {
        let next = (|req: Request| async move {
            Response::text(req.version().unwrap_or("none").to_owned())
        })
        .into_boxed_handler();
        let handler = Versioner::new().wrap(next);

        let response = handler.call(request("/")).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.body(), b"none");
    }

    #[tokio::test]
    async fn rejection_short_circuits_the_chain() {
        let reached = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&reached);
        let next = (move |_req: Request| {
            let flag = Arc::clone(&flag);
            async move {
                flag.store(true, Ordering::SeqCst);
                Response::text("downstream")
            }
        })
        .into_boxed_handler();
        let handler = Versioner::new().versions(["v1", "v2"]).wrap(next);

        let response = handler.call(request("/v3/awesome")).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert!(!reached.load(Ordering::SeqCst), "downstream handler must not run");
    }

    #[tokio::test]
    async fn mounted_allow_listed_version_forwards() {
        let next = (|req: Request| async move {
            Response::text(req.version().unwrap_or("none").to_owned())
        })
        .into_boxed_handler();
        let handler = Versioner::new()
            .mount_path("/mounted")
            .versions(["v1"])
            .wrap(next);

        let response = handler.call(request("/mounted/v1/foo")).await;
        assert_eq!(response.body(), b"v1");
    }
}
