//! Session store abstraction.
//!
//! Sessions are owned by the host: a cookie layer, a redis-backed store,
//! anything that can keep per-client state between requests. This crate only
//! needs to read and write one JSON field on whatever store the host attaches,
//! so that is all [`SessionStore`] asks for.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};

/// Per-client key/value state that outlives a single request.
///
/// Implementations decide how values are persisted. Concurrent requests for
/// the same client are not coordinated here; the last write wins.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn insert(&self, key: &str, value: Value);
    fn remove(&self, key: &str) -> Option<Value>;
}

// ── Session handle ────────────────────────────────────────────────────────────

/// Cheap, cloneable handle to one client's session.
///
/// The host's session layer stores a `Session` in the request extensions with
/// [`Request::with_session`](crate::Request::with_session).
#[derive(Clone)]
pub struct Session(Arc<dyn SessionStore>);

impl Session {
    pub fn new(store: impl SessionStore + 'static) -> Self {
        Self(Arc::new(store))
    }

    pub fn get(&self, key: &str) -> Option<Value> { self.0.get(key) }
    pub fn insert(&self, key: &str, value: Value) { self.0.insert(key, value) }
    pub fn remove(&self, key: &str) -> Option<Value> { self.0.remove(key) }

    /// True when both handles point at the same store.
    pub fn ptr_eq(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

// ── MemorySession ─────────────────────────────────────────────────────────────

/// In-process session state, shared by every clone.
///
/// Good for tests and single-process hosts. Nothing is persisted.
#[derive(Clone, Debug, Default)]
pub struct MemorySession {
    values: Arc<Mutex<Map<String, Value>>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.values.lock().clone()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().get(key).cloned()
    }

    fn insert(&self, key: &str, value: Value) {
        self.values.lock().insert(key.to_owned(), value);
    }

    fn remove(&self, key: &str) -> Option<Value> {
        self.values.lock().remove(key)
    }
}
