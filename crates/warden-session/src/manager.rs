//! The session manager: the sliding-window state machine.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Issuing a session on first login
//! - Renewing (sliding) a live session on repeat login
//! - Answering "is this session live?" and "does this code match?"
//! - Evicting expired sessions the moment a check finds them
//!
//! # Concurrency note
//!
//! `SessionManager` is NOT thread-safe by itself. It takes `&mut self`
//! even on the checking paths, because a check can evict. Shared access
//! goes through [`SessionRegistry`](crate::SessionRegistry), which puts
//! the whole manager behind one lock.

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use warden_protocol::PublicUser;

use crate::{Clock, Session, SessionConfig, SystemClock};

/// Tracks at most one session per email.
///
/// ## Lifecycle
///
/// ```text
/// issue_or_renew() ──→ [live] ──issue_or_renew()──→ [live, anchor += L]
///                        │
///                        ▼ now >= anchor + L
///             is_live() / validate() / list_active()
///                        │
///                        ▼
///                    [removed]
/// ```
pub struct SessionManager {
    /// Live (or not-yet-evicted) sessions, keyed by email.
    sessions: HashMap<String, Session>,

    config: SessionConfig,

    clock: Arc<dyn Clock>,
}

impl SessionManager {
    /// Creates an empty manager reading wall-clock time.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// Creates an empty manager reading time from `clock`.
    pub fn with_clock(config: SessionConfig, clock: impl Clock) -> Self {
        Self {
            sessions: HashMap::new(),
            config,
            clock: Arc::new(clock),
        }
    }

    /// Issues a session for `user`, or renews the one they already have.
    ///
    /// - Live session: the anchor slides forward by one full lifetime and
    ///   the existing code is returned.
    /// - No session, or an expired one: a fresh code is generated and the
    ///   anchor is set to now.
    ///
    /// Callers must not assume the code survives a gap longer than the
    /// lifetime.
    pub fn issue_or_renew(&mut self, user: PublicUser) -> String {
        let lifetime_ms = self.config.lifetime_ms();

        if self.is_live(&user.email) {
            if let Some(session) = self.sessions.get_mut(&user.email) {
                session.anchor_ms =
                    session.anchor_ms.saturating_add(lifetime_ms);
                tracing::info!(
                    email = %user.email,
                    anchor_ms = session.anchor_ms,
                    "session renewed"
                );
                return session.session_code.clone();
            }
        }

        let code = self.unused_code();
        let email = user.email.clone();
        let session = Session {
            user,
            session_code: code.clone(),
            anchor_ms: self.clock.now_ms(),
        };
        self.sessions.insert(email.clone(), session);

        tracing::info!(%email, "session issued");
        code
    }

    /// Returns `true` iff `email` has a session and `now < anchor + L`.
    ///
    /// An expired session is removed before returning `false`. This is the
    /// only place expiry is decided; every other path goes through it.
    pub fn is_live(&mut self, email: &str) -> bool {
        let now_ms = self.clock.now_ms();
        let lifetime_ms = self.config.lifetime_ms();

        let Some(session) = self.sessions.get(email) else {
            return false;
        };

        if session.is_live_at(now_ms, lifetime_ms) {
            return true;
        }

        self.sessions.remove(email);
        tracing::debug!(%email, "session expired, evicted");
        false
    }

    /// Returns `true` iff `email` has a session whose code is exactly
    /// `code` and which is still live.
    ///
    /// Unknown email, wrong code, and expired session all give the same
    /// `false`. A wrong code does not evict; an expired session is
    /// evicted whatever code was presented with it.
    pub fn validate(&mut self, email: &str, code: &str) -> bool {
        let code_matches = self
            .sessions
            .get(email)
            .is_some_and(|s| codes_match(&s.session_code, code));

        let live = self.is_live(email);

        code_matches && live
    }

    /// A snapshot of every session live right now, keyed by email.
    ///
    /// Expired sessions found along the way are evicted.
    pub fn list_active(&mut self) -> HashMap<String, Session> {
        let now_ms = self.clock.now_ms();
        let lifetime_ms = self.config.lifetime_ms();

        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| session.is_live_at(now_ms, lifetime_ms));
        let evicted = before - self.sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, "expired sessions evicted during listing");
        }

        self.sessions.clone()
    }

    /// Looks up a session without checking or evicting it.
    pub fn get(&self, email: &str) -> Option<&Session> {
        self.sessions.get(email)
    }

    /// Number of stored sessions, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there are no stored sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Generates codes until one is not held by any other session.
    fn unused_code(&self) -> String {
        loop {
            let code = generate_code();
            if !self.sessions.values().any(|s| s.session_code == code) {
                return code;
            }
        }
    }
}

/// Generates a random 32-character hex string (128 bits of entropy).
fn generate_code() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Exact equality whose running time does not depend on where the first
/// differing byte is.
fn codes_match(stored: &str, presented: &str) -> bool {
    let (a, b) = (stored.as_bytes(), presented.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// =========================================================================
// Tests
// =========================================================================
