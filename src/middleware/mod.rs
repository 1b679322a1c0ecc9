//! Middleware layer.
//!
//! Middleware intercepts a request on its way to the endpoint handler and is
//! the right place for cross-cutting concerns: sessions, flash messages,
//! request ids, tracing spans.
//!
//! A middleware receives the [`Request`] and a [`Next`] continuation. It may
//! inspect or extend the request, then forwards it with [`Next::run`]. `Next`
//! is consumed by `run`, so a middleware can forward at most once.
//!
//! ```rust
//! use flash_session::{Pipeline, Request, Response};
//! use flash_session::middleware::{FlashLayer, Next, from_fn};
//! use http::{Method, Uri};
//!
//! async fn log_path(req: Request, next: Next) -> Response {
//!     tracing::info!(path = req.path(), "request");
//!     next.run(req).await
//! }
//!
//! async fn home(_req: Request) -> &'static str { "home" }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let app = Pipeline::new(home)
//!     .layer(from_fn(log_path))
//!     .layer(FlashLayer::default());
//!
//! let res = app.call(Request::new(Method::GET, Uri::from_static("/"))).await;
//! assert_eq!(res.body().as_ref(), b"home");
//! # }
//! ```

mod flash;

pub use flash::{FlashConfig, FlashLayer};

use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::request::Request;
use crate::response::IntoResponse;

// ── Middleware trait ──────────────────────────────────────────────────────────

/// A request interceptor.
///
/// Implement it on a type for configurable layers (see [`FlashLayer`]), or
/// wrap an `async fn(Request, Next) -> impl IntoResponse` with [`from_fn`].
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

type BoxedMiddleware = Arc<dyn Middleware>;

/// Adapts an async function into a [`Middleware`].
pub fn from_fn<F, Fut, R>(f: F) -> FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    FromFn(f)
}

/// Middleware built by [`from_fn`].
pub struct FromFn<F>(F);

impl<F, Fut, R> Middleware for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let fut = (self.0)(req, next);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The rest of the chain, from the current middleware's point of view.
pub struct Next {
    chain: Arc<[BoxedMiddleware]>,
    endpoint: BoxedHandler,
    index: usize,
}

impl Next {
    /// Runs the remaining middleware, then the endpoint handler.
    pub fn run(self, req: Request) -> BoxFuture {
        let Some(layer) = self.chain.get(self.index).cloned() else {
            return self.endpoint.handle(req);
        };
        let next = Next {
            chain: self.chain,
            endpoint: self.endpoint,
            index: self.index + 1,
        };
        layer.call(req, next)
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// An endpoint handler behind an ordered stack of middleware.
///
/// Build it once at startup. The first layer added sees the request first.
/// Cloning shares the handler and layers.
#[derive(Clone)]
pub struct Pipeline {
    layers: Arc<[BoxedMiddleware]>,
    endpoint: BoxedHandler,
}

impl Pipeline {
    pub fn new(endpoint: impl Handler) -> Self {
        Self {
            layers: Arc::from(Vec::new()),
            endpoint: endpoint.into_boxed_handler(),
        }
    }

    /// Appends `middleware` after the layers already added. Returns `self`
    /// for chaining.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        let mut layers = self.layers.to_vec();
        layers.push(Arc::new(middleware));
        self.layers = layers.into();
        self
    }

    /// Drives one request through every layer and the endpoint.
    pub fn call(&self, req: Request) -> BoxFuture {
        let next = Next {
            chain: Arc::clone(&self.layers),
            endpoint: Arc::clone(&self.endpoint),
            index: 0,
        };
        next.run(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Response;
    use http::{Method, StatusCode, Uri};

    #[derive(Clone, Default)]
    struct Trail(Vec<&'static str>);

    fn request() -> Request {
        Request::new(Method::GET, Uri::from_static("/"))
    }

    async fn echo_trail(req: Request) -> String {
        req.extensions().get::<Trail>().map(|t| t.0.join(",")).unwrap_or_default()
    }

    fn tag(name: &'static str) -> impl Middleware {
        from_fn(move |mut req: Request, next: Next| {
            let mut trail = req.extensions().get::<Trail>().cloned().unwrap_or_default();
            trail.0.push(name);
            req.extensions_mut().insert(trail);
            next.run(req)
        })
    }

    #[tokio::test]
    async fn layers_run_in_insertion_order() {
        let app = Pipeline::new(echo_trail).layer(tag("a")).layer(tag("b"));
        let res = app.call(request()).await;
        assert_eq!(res.body().as_ref(), b"a,b");
    }

    #[tokio::test]
    async fn middleware_can_short_circuit() {
        let app = Pipeline::new(echo_trail)
            .layer(from_fn(|_req: Request, _next: Next| async { StatusCode::FORBIDDEN }))
            .layer(tag("never"));

        let res = app.call(request()).await;
        assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn empty_pipeline_calls_the_endpoint() {
        let app = Pipeline::new(|_req: Request| async { Response::text("done") });
        let res = app.clone().call(request()).await;
        assert_eq!(res.body().as_ref(), b"done");
    }
}
