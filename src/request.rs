//! Incoming HTTP request type.
//!
//! The transport (hyper, a test harness, whatever the host runs) builds a
//! [`Request`] and hands it to a [`Pipeline`](crate::Pipeline). Middleware
//! attaches per-request state to the typed extension map: the session layer
//! puts a [`Session`] there, the flash layer marks the request so that
//! [`Request::flash`] hands out a [`Flash`] accessor.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{Extensions, HeaderMap, Method, Uri};

use crate::flash::{Flash, FlashBinding};
use crate::session::Session;

/// An incoming HTTP request.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    extensions: Extensions,
}

impl Request {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            extensions: Extensions::new(),
        }
    }

    /// Appends a header. Returns `self` for chaining.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Attaches the client's session, as a session layer would.
    pub fn with_session(mut self, session: Session) -> Self {
        self.extensions.insert(session);
        self
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Header lookup. Names are case-insensitive; non-UTF-8 values are skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The session attached by the host's session layer, if any.
    pub fn session(&self) -> Option<&Session> {
        self.extensions.get::<Session>()
    }

    /// The flash accessor installed by [`FlashLayer`](crate::middleware::FlashLayer).
    ///
    /// The accessor works on the session attached right now, so it does not
    /// matter whether the session layer ran before or after the flash layer,
    /// or whether a handler swapped the session since. `None` when the flash
    /// layer is not part of the chain.
    pub fn flash(&self) -> Option<Flash> {
        let binding = self.extensions.get::<FlashBinding>()?;
        Some(Flash::from_parts(*binding, self.session().cloned()))
    }

    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }
}
