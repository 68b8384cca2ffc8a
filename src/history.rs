//! Per-session, append-only log of successful analyses.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;

use crate::session::SessionId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub sentence: String,
    pub result: String,
}

/// Keyed by session id. Entries are never edited or removed and sessions
/// live for the lifetime of the process.
#[derive(Clone, Default)]
pub struct HistoryStore {
    sessions: Arc<DashMap<SessionId, Vec<HistoryEntry>>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, session: SessionId, sentence: &str, result: &str) {
        self.sessions.entry(session).or_default().push(HistoryEntry {
            sentence: sentence.to_string(),
            result: result.to_string(),
        });
    }

    /// Whether `session` has recorded at least one analysis here.
    pub fn contains(&self, session: SessionId) -> bool {
        self.sessions.contains_key(&session)
    }

    /// Entries in submission order; empty for unknown sessions.
    pub fn list(&self, session: SessionId) -> Vec<HistoryEntry> {
        self.sessions
            .get(&session)
            .map(|entries| entries.value().clone())
            .unwrap_or_default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
