//! Session types: the record of one identity's recent login.
//!
//! A session tracks:
//! - WHO logged in (a password-free [`PublicUser`] snapshot)
//! - HOW they prove it on later requests (an opaque session code)
//! - WHEN the current window started (the anchor, in epoch milliseconds)

use std::time::Duration;

use serde::Serialize;
use warden_protocol::PublicUser;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long (in seconds) a session stays live after its anchor.
    ///
    /// Default: 600 seconds (10 minutes).
    pub lifetime_secs: u64,
}

impl SessionConfig {
    /// The lifetime as a `Duration`.
    pub fn lifetime(&self) -> Duration {
        Duration::from_secs(self.lifetime_secs)
    }

    pub(crate) fn lifetime_ms(&self) -> u64 {
        self.lifetime_secs.saturating_mul(1_000)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { lifetime_secs: 600 }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One identity's session.
///
/// Serialized for the administrative `/sessions` listing as
/// `{ "user": {..}, "sessionCode": "..", "date": <epoch ms> }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Snapshot of the user at the time the session was first issued.
    pub user: PublicUser,

    /// Opaque code the caller presents on privileged requests. 32
    /// lowercase hex characters (128 bits of randomness). Stays the same
    /// across renewals.
    pub session_code: String,

    /// Issued-or-renewed anchor in epoch milliseconds. The session is
    /// live while `now < date + lifetime`.
    #[serde(rename = "date")]
    pub anchor_ms: u64,
}

impl Session {
    /// The first instant (epoch ms) at which this session is expired.
    pub fn expires_at_ms(&self, lifetime_ms: u64) -> u64 {
        self.anchor_ms.saturating_add(lifetime_ms)
    }

    /// `true` iff `now_ms` falls strictly inside the window.
    pub fn is_live_at(&self, now_ms: u64, lifetime_ms: u64) -> bool {
        now_ms < self.expires_at_ms(lifetime_ms)
    }
}
