//! Minimal verso example — a versioned JSON API.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example versioned
//!
//! Try:
//!   curl http://localhost:3000/v1/users/42      # 200, api v1
//!   curl http://localhost:3000/v2/users/42      # 200, api v2
//!   curl http://localhost:3000/v9/users/42      # 404 — not in the allow-list
//!   curl http://localhost:3000/                 # 404 — no route, no version

use http::Method;
use verso::{App, Request, Response, Router, Server, Versioner};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let router = Router::new()
        .on(Method::GET, "/{version}/users/{id}", get_user);

    // Only v1 and v2 exist. The versioner rejects everything else before
    // routing, so handlers never see an unknown version.
    let app = App::new(router)
        .layer(Versioner::new().versions(["v1", "v2"]));

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET /{version}/users/{id}
async fn get_user(req: Request) -> Response {
    let version = req.version().unwrap_or("unversioned");
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","api":"{version}"}}"#).into_bytes())
}
