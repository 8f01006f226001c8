//! Server-side state for refresh tokens
//!
//! A refresh token is only honored while its row exists here. Rows are
//! removed the moment they are looked up for rotation, whether or not the
//! rotation then succeeds.

use crate::backend::{MemoryBackend, SessionBackend};
use keygate_core::ClockSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Persisted half of a refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSession {
    /// Random identifier embedded in the refresh token as `jti`
    pub refresh_id: String,
    /// Normalized owner address
    pub address: String,
    /// Expiry, epoch milliseconds
    pub expires_at: u64,
}

/// Refresh sessions keyed by refresh id
pub struct RefreshSessionStore {
    backend: Arc<dyn SessionBackend<RefreshSession>>,
    clock: Arc<dyn ClockSource>,
}

impl RefreshSessionStore {
    /// Store over an in-memory backend
    pub fn new(clock: Arc<dyn ClockSource>) -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()), clock)
    }

    /// Store over a caller-supplied backend
    pub fn with_backend(
        backend: Arc<dyn SessionBackend<RefreshSession>>,
        clock: Arc<dyn ClockSource>,
    ) -> Self {
        Self { backend, clock }
    }

    /// Record a new session
    pub fn insert(&self, session: RefreshSession) {
        self.backend.put(session.refresh_id.clone(), session);
    }

    /// Remove and return the session; a second call for the same id yields `None`
    pub fn consume(&self, refresh_id: &str) -> Option<RefreshSession> {
        self.backend.take(refresh_id)
    }

    /// Remove the session if present
    pub fn revoke(&self, refresh_id: &str) -> bool {
        self.backend.take(refresh_id).is_some()
    }

    /// Whether a session row exists for `refresh_id`
    pub fn contains(&self, refresh_id: &str) -> bool {
        self.backend.get(refresh_id).is_some()
    }

    /// Drop expired sessions, returning how many were removed
    pub fn prune_expired(&self) -> usize {
        let now = self.clock.now_ms();
        self.backend.retain(&|s: &RefreshSession| now <= s.expires_at)
    }

    /// Number of stored sessions
    pub fn len(&self) -> usize {
        self.backend.len()
    }

    /// Whether no sessions are stored
    pub fn is_empty(&self) -> bool {
        self.backend.is_empty()
    }
}
