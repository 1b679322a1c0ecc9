//! Minimal flash-session example: a post-redirect-get round trip.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! There is no network here: requests are built by hand and pushed through
//! the pipeline, the way a transport adapter would.

use std::collections::HashMap;
use std::sync::Arc;

use flash_session::middleware::{FlashLayer, Next, from_fn};
use flash_session::{FlashError, MemorySession, Pipeline, Request, Response, Session};
use http::{Method, StatusCode, Uri};
use parking_lot::Mutex;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // Stand-in for a cookie session layer: every request in this demo belongs
    // to the same client, "sid-1".
    let sessions: Arc<Mutex<HashMap<&'static str, Session>>> = Arc::default();
    let session_layer = from_fn(move |req: Request, next: Next| {
        let session = sessions
            .lock()
            .entry("sid-1")
            .or_insert_with(|| Session::new(MemorySession::new()))
            .clone();
        next.run(req.with_session(session))
    });

    let app = Pipeline::new(route)
        .layer(session_layer)
        .layer(FlashLayer::default());

    for (method, path) in [
        (Method::POST, "/messages"),
        (Method::POST, "/messages"),
        (Method::GET, "/inbox"),
        (Method::GET, "/inbox"),
    ] {
        let res = app.call(Request::new(method.clone(), Uri::from_static(path))).await;
        println!(
            "{method} {path} -> {} {}",
            res.status_code(),
            String::from_utf8_lossy(res.body()),
        );
    }
}

// POST /messages → 303, queues a notice
// GET  /inbox    → 200, drains every notice
async fn route(req: Request) -> Result<Response, FlashError> {
    let flash = req.flash().ok_or(FlashError::MissingSession)?;

    if req.method() == Method::POST {
        let count = flash.queue("info", "message %d delivered to %s", [
            serde_json::json!(flash.peek("info")?.len() + 1),
            serde_json::json!("alice"),
        ])?;
        tracing::info!(count, "queued");
        return Ok(Response::builder()
            .status(StatusCode::SEE_OTHER)
            .header("location", "/inbox")
            .no_body());
    }

    let notices = flash.drain()?;
    let body = serde_json::to_vec(&notices).map_err(FlashError::Encode)?;
    Ok(Response::json(body))
}
