//! Wire protocol for Warden.
//!
//! This crate defines everything that crosses the boundary between the
//! auth service and its internal callers:
//!
//! - **Types** ([`User`], [`PublicUser`], [`Role`], request bodies,
//!   [`Envelope`]) — the records and messages the service speaks.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how request bodies and
//!   responses are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while doing so.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about sessions, storage, or HTTP.
//! Both the session layer and the store depend on it for the shared
//! record types.
//!
//! ```text
//! Gateway (HTTP) → Protocol (bodies, envelopes) → Session / Store
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    AddRoleRequest, AddUserRequest, ConfigRoleRequest, Envelope, Logged,
    LoginRequest, LoginResponse, PublicUser, Role, RoleConfig,
    UpdateUserRoleRequest, User,
};
