//! Process-wide session store keyed by caller/session identifier.
//!
//! Each session remembers the last asked question, the full ranked result
//! set of its last search, and the pagination cursor into that set. Sessions
//! are created lazily on first reference and live for the process lifetime;
//! there is no eviction in the current design.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::structs::hit::Hit;

/// Per-session retrieval state.
///
/// `cursor` only moves forward within one result set; a new (non-continue)
/// query replaces `results` and resets it to zero.
#[derive(Debug, Default)]
pub struct Session {
    /// Most recent non-"continue" question, `None` until the first query.
    pub last_query: Option<String>,
    /// Full ranked result set from the last search.
    pub results: Vec<Hit>,
    /// Index into `results` where the next batch starts.
    pub cursor: usize,
}

/// Map from session identifier to its state.
///
/// The outer map hands out `Arc<Mutex<Session>>` so that concurrent calls
/// for the same identifier serialize on the per-session lock instead of
/// blocking the whole store.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the session for `session_id`, creating a default one on first
    /// access.
    pub async fn get_or_create(&self, session_id: &str) -> Arc<Mutex<Session>> {
        if let Some(session) = self.sessions.read().await.get(session_id).cloned() {
            return session;
        }
        let mut w = self.sessions.write().await;
        w.entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::default())))
            .clone()
    }

    /// Number of known sessions (diagnostics only).
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_default_session_on_first_access() {
        let store = SessionStore::new();
        let session = store.get_or_create("caller-1").await;
        let guard = session.lock().await;
        assert!(guard.last_query.is_none());
        assert!(guard.results.is_empty());
        assert_eq!(guard.cursor, 0);
    }

    #[tokio::test]
    async fn returns_the_same_session_for_the_same_id() {
        let store = SessionStore::new();
        let first = store.get_or_create("caller-1").await;
        first.lock().await.cursor = 9;

        let second = store.get_or_create("caller-1").await;
        assert_eq!(second.lock().await.cursor, 9);
        assert_eq!(store.len().await, 1);
    }
}
