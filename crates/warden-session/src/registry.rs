//! The shared session registry.
//!
//! Many requests hit the sessions at once, and even the "read" paths
//! write (they evict). So the whole [`SessionManager`] sits behind a
//! single lock, taken once per operation and released before the caller
//! does anything else. No await happens while it is held.

use std::collections::HashMap;

use tokio::sync::Mutex;
use warden_protocol::PublicUser;

use crate::{Clock, Session, SessionConfig, SessionManager};

/// Process-wide owner of all sessions.
///
/// Only the operations below are exposed; the underlying map is never
/// handed out for mutation.
pub struct SessionRegistry {
    inner: Mutex<SessionManager>,
}

impl SessionRegistry {
    /// An empty registry reading wall-clock time.
    pub fn new(config: SessionConfig) -> Self {
        Self::from_manager(SessionManager::new(config))
    }

    /// An empty registry reading time from `clock`.
    pub fn with_clock(config: SessionConfig, clock: impl Clock) -> Self {
        Self::from_manager(SessionManager::with_clock(config, clock))
    }

    fn from_manager(manager: SessionManager) -> Self {
        Self {
            inner: Mutex::new(manager),
        }
    }

    /// See [`SessionManager::issue_or_renew`].
    pub async fn issue_or_renew(&self, user: PublicUser) -> String {
        self.inner.lock().await.issue_or_renew(user)
    }

    /// See [`SessionManager::is_live`].
    pub async fn is_live(&self, email: &str) -> bool {
        self.inner.lock().await.is_live(email)
    }

    /// See [`SessionManager::validate`].
    pub async fn validate(&self, email: &str, code: &str) -> bool {
        self.inner.lock().await.validate(email, code)
    }

    /// See [`SessionManager::list_active`].
    pub async fn list_active(&self) -> HashMap<String, Session> {
        self.inner.lock().await.list_active()
    }

    /// Number of stored sessions, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}
