//! # Warden
//!
//! Session-gated role authorization for internal services.
//!
//! Callers log in with an email and password and get back an opaque
//! session code. Privileged operations (creating roles, configuring their
//! capabilities, assigning roles to users) require a live session whose
//! owner holds the `ADMIN` role. Every request must also carry the shared
//! service key in the `HARMONY_MICRO_SERVICES` header.
//!
//! ## Crates
//!
//! - [`warden_protocol`] — records, request bodies, the response envelope
//! - [`warden_session`] — the session registry and password hashing
//! - [`warden_store`] — the user/role store seam and an in-memory store
//! - `warden` (this crate) — authorization and the HTTP gateway
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use warden::prelude::*;
//!
//! # async fn run() -> Result<(), WardenError> {
//! let server = WardenServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .service_key("change-me")
//!     .build(MemoryStore::new(), Argon2Verifier::default())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod authz;
mod error;
mod handler;
mod server;

pub use authz::{ADMIN_ROLE, Gatekeeper};
pub use error::{AccessError, ErrorKind, WardenError};
pub use server::{SERVICE_KEY_HEADER, WardenServer, WardenServerBuilder};

pub use warden_protocol;
pub use warden_session;
pub use warden_store;

/// Everything needed to stand up a server.
pub mod prelude {
    pub use crate::{
        ADMIN_ROLE, AccessError, ErrorKind, Gatekeeper, WardenError,
        WardenServer, WardenServerBuilder,
    };
    pub use warden_protocol::{
        Codec, Envelope, JsonCodec, PublicUser, Role, RoleConfig, User,
    };
    pub use warden_session::{
        Argon2Verifier, Clock, CredentialVerifier, SessionConfig,
        SessionRegistry, SystemClock,
    };
    pub use warden_store::{CapabilityStore, MemoryStore, StoreError};
}
