//! The flash accessor.
//!
//! A flash message is a short, typed note stored in the client's session and
//! shown once on a later request, usually right after a redirect. Handlers
//! reach the accessor through [`Request::flash`](crate::Request::flash) once
//! [`FlashLayer`](crate::middleware::FlashLayer) has run.
//!
//! Three operations, deliberately asymmetric:
//!
//! | Operation | Effect on the session | Returns |
//! |---|---|---|
//! | [`Flash::queue`] | appends one formatted message under `kind` | messages now queued under `kind` |
//! | [`Flash::peek`]  | none | messages under `kind`, possibly empty |
//! | [`Flash::drain`] | removes the whole flash store | every kind, as it was before removal |
//!
//! ```rust
//! use flash_session::{Flash, MemorySession, Session};
//!
//! let flash = Flash::new(Session::new(MemorySession::new()));
//!
//! assert_eq!(flash.queue("info", "email sent to %s", ["alice"])?, 1);
//! assert_eq!(flash.queue("info", "email re-sent", [""; 0])?, 2);
//! assert_eq!(flash.peek("info")?, ["email sent to alice", "email re-sent"]);
//!
//! let all = flash.drain()?;
//! assert_eq!(all.get("info").len(), 2);
//! assert!(flash.drain()?.is_empty());
//! # Ok::<(), flash_session::FlashError>(())
//! ```

mod format;

pub use format::format_message;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::error::FlashError;
use crate::session::Session;

/// Session key the flash store is kept under.
pub const FLASH_SESSION_KEY: &str = "flash";

static NEXT_BINDING: AtomicU64 = AtomicU64::new(1);

/// Marker [`FlashLayer`](crate::middleware::FlashLayer) leaves in the request
/// extensions. The accessor itself is assembled on each
/// [`Request::flash`](crate::Request::flash) call so it always sees the
/// session the request carries at that moment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FlashBinding(u64);

impl FlashBinding {
    pub(crate) fn next() -> Self {
        Self(NEXT_BINDING.fetch_add(1, Ordering::Relaxed))
    }
}

// ── FlashStore ────────────────────────────────────────────────────────────────

/// Queued messages, grouped by kind (`"info"`, `"error"`, ...).
///
/// Serialises as a JSON object of string arrays. Kinds appear on first write;
/// reading a kind that was never written yields an empty slice.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlashStore(BTreeMap<String, Vec<String>>);

impl FlashStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: &str) -> &[String] {
        self.0.get(kind).map_or(&[], Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Kinds with at least one entry, in lexical order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Appends `message` under `kind` and returns the new count for `kind`.
    fn push(&mut self, kind: &str, message: String) -> usize {
        let queue = self.0.entry(kind.to_owned()).or_default();
        queue.push(message);
        queue.len()
    }
}

impl From<BTreeMap<String, Vec<String>>> for FlashStore {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        Self(map)
    }
}

// ── Operations ────────────────────────────────────────────────────────────────

/// One call to the accessor, spelled out.
///
/// Hosts that route flash calls through a single entry point (a template
/// helper, an RPC surface) build one of these and hand it to [`Flash::apply`].
#[derive(Clone, Debug, PartialEq)]
pub enum FlashOp {
    Queue { kind: String, template: String, args: Vec<Value> },
    Peek { kind: String },
    DrainAll,
}

/// What [`Flash::apply`] produced, one variant per [`FlashOp`].
#[derive(Clone, Debug, PartialEq)]
pub enum FlashOutcome {
    Queued(usize),
    Messages(Vec<String>),
    Drained(FlashStore),
}

// ── Flash ─────────────────────────────────────────────────────────────────────

/// Flash accessor over one request's session.
///
/// Cloning is cheap; every clone talks to the same session. Obtain one from
/// [`Request::flash`](crate::Request::flash), or build one directly over a
/// session with [`Flash::new`].
#[derive(Clone, Debug)]
pub struct Flash {
    session: Option<Session>,
    binding: u64,
}

impl Flash {
    /// Accessor over `session`, with a fresh binding id.
    pub fn new(session: Session) -> Self {
        Self::from_parts(FlashBinding::next(), Some(session))
    }

    /// A request without a session still gets an accessor; its operations
    /// fail with [`FlashError::MissingSession`].
    pub(crate) fn from_parts(binding: FlashBinding, session: Option<Session>) -> Self {
        Self { session, binding: binding.0 }
    }

    /// Identifies the installation that bound this accessor. Unique per
    /// process, increasing.
    pub fn binding(&self) -> u64 {
        self.binding
    }

    /// Formats `template` with `args` and queues the result under `kind`.
    ///
    /// Returns how many messages are now queued under `kind`.
    pub fn queue<I, A>(&self, kind: &str, template: &str, args: I) -> Result<usize, FlashError>
    where
        I: IntoIterator<Item = A>,
        A: Into<Value>,
    {
        let args: Vec<Value> = args.into_iter().map(Into::into).collect();
        self.queue_formatted(kind, template, &args)
    }

    /// Messages queued under `kind`. Leaves the session untouched.
    pub fn peek(&self, kind: &str) -> Result<Vec<String>, FlashError> {
        let store = load(self.session()?)?;
        let messages = store.get(kind).to_vec();
        trace!(kind, count = messages.len(), "flash peek");
        Ok(messages)
    }

    /// Every queued message, after which the session holds none.
    pub fn drain(&self) -> Result<FlashStore, FlashError> {
        let session = self.session()?;
        let store = load(session)?;
        session.remove(FLASH_SESSION_KEY);
        trace!(kinds = store.0.len(), "flash drained");
        Ok(store)
    }

    pub fn apply(&self, op: FlashOp) -> Result<FlashOutcome, FlashError> {
        match op {
            FlashOp::Queue { kind, template, args } => {
                self.queue_formatted(&kind, &template, &args).map(FlashOutcome::Queued)
            }
            FlashOp::Peek { kind } => self.peek(&kind).map(FlashOutcome::Messages),
            FlashOp::DrainAll => self.drain().map(FlashOutcome::Drained),
        }
    }

    fn queue_formatted(&self, kind: &str, template: &str, args: &[Value]) -> Result<usize, FlashError> {
        if kind.is_empty() {
            return Err(FlashError::EmptyArgument("kind"));
        }
        if template.is_empty() {
            return Err(FlashError::EmptyArgument("template"));
        }
        let session = self.session()?;

        let mut store = load(session)?;
        let count = store.push(kind, format_message(template, args));
        let encoded = serde_json::to_value(&store).map_err(FlashError::Encode)?;
        session.insert(FLASH_SESSION_KEY, encoded);

        trace!(kind, count, "flash queued");
        Ok(count)
    }

    fn session(&self) -> Result<&Session, FlashError> {
        self.session.as_ref().ok_or(FlashError::MissingSession)
    }
}

fn load(session: &Session) -> Result<FlashStore, FlashError> {
    match session.get(FLASH_SESSION_KEY) {
        None | Some(Value::Null) => Ok(FlashStore::new()),
        Some(value) => serde_json::from_value(value).map_err(FlashError::Decode),
    }
}
