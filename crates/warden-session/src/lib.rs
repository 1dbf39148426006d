//! Session lifecycle for Warden.
//!
//! This crate owns everything about "has this identity logged in
//! recently?":
//!
//! 1. **Credentials** — hashing and checking passwords
//!    ([`CredentialVerifier`] trait, [`Argon2Verifier`])
//! 2. **Session state** — the single-owner state machine
//!    ([`SessionManager`]) and its shared, locked wrapper
//!    ([`SessionRegistry`])
//! 3. **Time** — an injectable [`Clock`] so expiry is testable without
//!    sleeping
//!
//! # Lifecycle of one session
//!
//! ```text
//! [absent] ──issue_or_renew──→ [live, anchor=t]
//! [live, anchor=t] ──issue_or_renew before t+L──→ [live, anchor=t+L]   same code
//! [live, anchor=t] ──issue_or_renew at/after t+L──→ [live, anchor=now] new code
//! [live, anchor=t] ──is_live / validate at/after t+L──→ [absent]
//! ```
//!
//! Expiry is lazy: nothing runs in the background. An expired session is
//! removed by whichever call next touches it.

mod auth;
mod clock;
mod error;
mod manager;
mod registry;
mod session;

pub use auth::{Argon2Verifier, CredentialVerifier};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::SessionError;
pub use manager::SessionManager;
pub use registry::SessionRegistry;
pub use session::{Session, SessionConfig};
