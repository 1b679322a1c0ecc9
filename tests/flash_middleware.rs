//! End-to-end behaviour of the flash layer inside a pipeline.

use flash_session::middleware::{FlashConfig, FlashLayer, Next, from_fn};
use flash_session::{
    FLASH_SESSION_KEY, FlashError, FlashStore, MemorySession, Pipeline, Request, Response, Session,
    SessionStore,
};
use http::{Method, StatusCode, Uri};
use serde_json::json;

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn get(path: &'static str, session: &Session) -> Request {
    Request::new(Method::GET, Uri::from_static(path)).with_session(session.clone())
}

fn body(res: &Response) -> String {
    String::from_utf8(res.body().to_vec()).unwrap()
}

/// Binding seen by the first flash layer, recorded before the second runs.
#[derive(Clone, Copy)]
struct FirstBinding(u64);

fn record_binding() -> impl flash_session::middleware::Middleware {
    from_fn(|mut req: Request, next: Next| {
        if let Some(binding) = req.flash().map(|f| f.binding()) {
            req.extensions_mut().insert(FirstBinding(binding));
        }
        next.run(req)
    })
}

async fn report_bindings(req: Request) -> String {
    let first = req.extensions().get::<FirstBinding>().map(|b| b.0);
    let current = req.flash().map(|f| f.binding());
    format!("{first:?} {current:?}")
}

async fn send_mail(req: Request) -> Result<Response, FlashError> {
    let flash = req.flash().ok_or(FlashError::MissingSession)?;
    let to = req.header("x-recipient").unwrap_or("nobody").to_owned();
    let count = flash.queue("info", "email sent to %s", [to])?;
    Ok(Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header("location", "/inbox")
        .header("x-queued", &count.to_string())
        .no_body())
}

async fn inbox(req: Request) -> Result<Response, FlashError> {
    let flash = req.flash().ok_or(FlashError::MissingSession)?;
    let messages: FlashStore = flash.drain()?;
    let bytes = serde_json::to_vec(&messages).map_err(FlashError::Encode)?;
    Ok(Response::json(bytes))
}

// ── Queue / peek / drain through the layer ────────────────────────────────────

#[tokio::test]
async fn queue_increments_per_request() {
    let app = Pipeline::new(send_mail).layer(FlashLayer::default());
    let session = Session::new(MemorySession::new());

    for expected in 1..=3 {
        let req = get("/send", &session).with_header(
            http::header::HeaderName::from_static("x-recipient"),
            http::header::HeaderValue::from_static("alice"),
        );
        let res = app.call(req).await;
        assert_eq!(res.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(res.header("x-queued"), Some(expected.to_string().as_str()));
    }
}

#[tokio::test]
async fn post_redirect_get_shows_messages_once() {
    let send = Pipeline::new(send_mail).layer(FlashLayer::default());
    let show = Pipeline::new(inbox).layer(FlashLayer::default());
    let session = Session::new(MemorySession::new());

    let req = get("/send", &session).with_header(
        http::header::HeaderName::from_static("x-recipient"),
        http::header::HeaderValue::from_static("alice"),
    );
    send.call(req).await;

    let first = show.call(get("/inbox", &session)).await;
    assert_eq!(first.status_code(), StatusCode::OK);
    assert_eq!(body(&first), r#"{"info":["email sent to alice"]}"#);

    let second = show.call(get("/inbox", &session)).await;
    assert_eq!(body(&second), "{}");
    assert!(session.get(FLASH_SESSION_KEY).is_none());
}

#[tokio::test]
async fn peek_in_one_handler_leaves_messages_for_the_next() {
    let peek = Pipeline::new(|req: Request| async move {
        let flash = req.flash().ok_or(FlashError::MissingSession)?;
        let errors = flash.peek("error")?;
        Ok::<_, FlashError>(errors.join("|"))
    })
    .layer(FlashLayer::default());
    let store = MemorySession::new();
    let session = Session::new(store.clone());
    store.insert(FLASH_SESSION_KEY, json!({"error": ["bad password"], "info": ["hi"]}));

    for _ in 0..2 {
        let res = peek.call(get("/login", &session)).await;
        assert_eq!(body(&res), "bad password");
    }
    assert_eq!(
        store.get(FLASH_SESSION_KEY),
        Some(json!({"error": ["bad password"], "info": ["hi"]})),
    );
}

#[tokio::test]
async fn unknown_kind_reads_empty() {
    let app = Pipeline::new(|req: Request| async move {
        let flash = req.flash().ok_or(FlashError::MissingSession)?;
        Ok::<_, FlashError>(format!("{}", flash.peek("warning")?.len()))
    })
    .layer(FlashLayer::default());
    let session = Session::new(MemorySession::new());

    let res = app.call(get("/", &session)).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(body(&res), "0");
}

// ── Installation modes ────────────────────────────────────────────────────────

#[tokio::test]
async fn safe_mode_binds_once() {
    let app = Pipeline::new(report_bindings)
        .layer(FlashLayer::default())
        .layer(record_binding())
        .layer(FlashLayer::default());
    let session = Session::new(MemorySession::new());

    let res = app.call(get("/", &session)).await;
    let text = body(&res);
    let (first, current) = text.split_once(' ').unwrap();
    assert!(first.starts_with("Some("));
    assert_eq!(first, current);
}

#[tokio::test]
async fn unsafe_mode_rebinds_every_time() {
    let layer = FlashLayer::new(FlashConfig::new().unsafe_reinstall(true));
    let app = Pipeline::new(report_bindings)
        .layer(layer.clone())
        .layer(record_binding())
        .layer(layer);
    let session = Session::new(MemorySession::new());

    let res = app.call(get("/", &session)).await;
    let text = body(&res);
    let (first, current) = text.split_once(' ').unwrap();
    assert!(first.starts_with("Some("));
    assert_ne!(first, current);
}

#[tokio::test]
async fn rebinding_keeps_queued_messages() {
    let layer = FlashLayer::new(FlashConfig::new().unsafe_reinstall(true));
    let queue_then_forward = from_fn(|req: Request, next: Next| async move {
        if let Some(flash) = req.flash() {
            flash.queue("info", "queued before rebind", [""; 0]).unwrap();
        }
        next.run(req).await
    });
    let app = Pipeline::new(inbox)
        .layer(layer.clone())
        .layer(queue_then_forward)
        .layer(layer);
    let session = Session::new(MemorySession::new());

    let res = app.call(get("/", &session)).await;
    assert_eq!(body(&res), r#"{"info":["queued before rebind"]}"#);
}

#[tokio::test]
async fn flash_layer_may_run_before_the_session_layer() {
    let store = MemorySession::new();
    let session = Session::new(store.clone());
    let attach_session =
        from_fn(move |req: Request, next: Next| next.run(req.with_session(session.clone())));

    let app = Pipeline::new(|req: Request| async move {
        assert!(req.session().is_some());
        let flash = req.flash().ok_or(FlashError::MissingSession)?;
        Ok::<_, FlashError>(flash.queue("info", "hi", [""; 0])?.to_string())
    })
    .layer(FlashLayer::default())
    .layer(attach_session);

    let res = app.call(Request::new(Method::POST, Uri::from_static("/"))).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(body(&res), "1");
    assert_eq!(store.get(FLASH_SESSION_KEY), Some(json!({"info": ["hi"]})));
}

#[tokio::test]
async fn safe_mode_skip_still_sees_a_late_session() {
    let store = MemorySession::new();
    let session = Session::new(store.clone());
    let attach_session =
        from_fn(move |req: Request, next: Next| next.run(req.with_session(session.clone())));

    let app = Pipeline::new(|req: Request| async move {
        let flash = req.flash().ok_or(FlashError::MissingSession)?;
        flash.queue("error", "try again", [""; 0])?;
        Ok::<_, FlashError>(StatusCode::NO_CONTENT)
    })
    .layer(FlashLayer::default())
    .layer(attach_session)
    .layer(FlashLayer::default());

    let res = app.call(Request::new(Method::POST, Uri::from_static("/"))).await;
    assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(
        store.get(FLASH_SESSION_KEY),
        Some(json!({"error": ["try again"]})),
    );
}

// ── Failure path ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_session_surfaces_as_server_error() {
    let app = Pipeline::new(send_mail).layer(FlashLayer::default());
    let req = Request::new(Method::POST, Uri::from_static("/send"));

    let res = app.call(req).await;
    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn accessor_is_absent_without_the_layer() {
    let app = Pipeline::new(|req: Request| async move {
        if req.flash().is_some() { "bound" } else { "unbound" }
    });
    let session = Session::new(MemorySession::new());

    let res = app.call(get("/", &session)).await;
    assert_eq!(body(&res), "unbound");
}
