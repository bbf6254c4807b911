//! # verso
//!
//! Path-based API versioning middleware for small hyper services.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! Clients put the API version in the URL — `/v1/users`, `/v2/users` — and
//! the rest of the application should never have to parse it out again.
//! verso extracts the version from the first path segment once, validates
//! it, and publishes it on the request context. The path itself is never
//! rewritten: routes, logs, and redirects all see the URL the client sent.
//!
//! What the versioner does:
//!
//! - **Extraction** — first `/`-delimited segment becomes the version
//! - **Shape check** — optional regex the segment must match in full
//! - **Allow-list** — optional set of known versions; anything else is `404`
//! - **Prefix / mount-path** — optional leading path to skip first
//!
//! What it deliberately does not do:
//!
//! - **Rewrite the path** — the version stays in the URL
//! - **Header or Accept-based versioning** — path only
//! - **Default versions** — an absent version is reported as absent
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::Method;
//! use verso::{App, Request, Response, Router, Server, Versioner};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::new()
//!         .on(Method::GET, "/{version}/users/{id}", get_user);
//!
//!     let app = App::new(router)
//!         .layer(Versioner::new().versions(["v1", "v2"]));
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     // "v1" or "v2" — anything else was already rejected with 404.
//!     let version = req.version().unwrap_or("v1");
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}","api":"{version}"}}"#).into_bytes())
//! }
//! ```

mod app;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

pub use app::App;
pub use error::Error;
pub use handler::Handler;
pub use middleware::{Middleware, VersionNotAllowed, Versioner};
pub use request::{API_VERSION, Request};
pub use response::{IntoResponse, Response};
pub use router::Router;
pub use server::Server;

pub use http::{Method, StatusCode};
