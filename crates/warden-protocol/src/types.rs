//! Core protocol types for Warden's wire format.
//!
//! Records (`User`, `PublicUser`, `Role`), request bodies, and the
//! response [`Envelope`]. Field names on the wire are camelCase because
//! the calling services are written against that shape.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A role's capability map: capability name → granted flag.
///
/// `BTreeMap` rather than `HashMap` so listings serialize in a stable
/// order. An empty map grants nothing.
pub type RoleConfig = BTreeMap<String, bool>;

/// A named capability bundle.
///
/// The name is the unique key and never changes after creation. A new
/// role always starts with an empty `config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub config: RoleConfig,
}

impl Role {
    /// Creates a role with no capabilities.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: RoleConfig::new(),
        }
    }

    /// Returns `true` if the capability is present and set.
    pub fn grants(&self, capability: &str) -> bool {
        self.config.get(capability).copied().unwrap_or(false)
    }
}

/// A stored user account, including the password digest.
///
/// This type deliberately does NOT implement `Serialize`: it cannot be
/// placed in a response. Convert it with [`User::to_public`] first.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    /// Unique key.
    pub email: String,
    /// Password digest (PHC string). Never plaintext.
    pub password: String,
    /// Name of the user's role; empty when unset.
    pub role: String,
}

impl User {
    /// The password-free view of this user.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

// Hand-written so the digest never ends up in a log line.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// The only user representation that crosses the service boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        user.to_public()
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Caller identity carried by every session-gated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logged {
    /// Email of the calling user.
    pub from_user: String,
    /// Session code returned by `/login`.
    pub session_code: String,
}

/// Body of `POST /login`.
#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Response data of a successful `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The session code to present on privileged requests.
    pub session: String,
    pub user: PublicUser,
}

/// Body of `POST /create-user`.
#[derive(Clone, Deserialize)]
pub struct AddUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: String,
}

impl AddUserRequest {
    /// Rejects requests with an empty name, email, or password.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] naming the first empty
    /// field.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        require_non_blank("name", &self.name)?;
        require_non_blank("email", &self.email)?;
        require_non_blank("password", &self.password)
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<(), ProtocolError> {
    if value.trim().is_empty() {
        return Err(ProtocolError::InvalidMessage(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

impl fmt::Debug for AddUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddUserRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Body of `POST /add-role`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddRoleRequest {
    #[serde(flatten)]
    pub logged: Logged,
    pub name: String,
}

impl AddRoleRequest {
    /// Rejects a blank role name.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] if `name` is empty or
    /// whitespace.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        require_non_blank("name", &self.name)
    }
}

/// Body of `POST /config-role`. Replaces the whole capability map.
///
/// Older callers send the role key as `id`; both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfigRoleRequest {
    #[serde(flatten)]
    pub logged: Logged,
    #[serde(alias = "id")]
    pub name: String,
    pub config: RoleConfig,
}

/// Body of `POST /set-role`: assign `role` to the user `email`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateUserRoleRequest {
    #[serde(flatten)]
    pub logged: Logged,
    pub email: String,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The uniform response wrapper.
///
/// On the wire `error` is either `false` or a message string, and `data`
/// is omitted when there is nothing to return:
///
/// ```text
/// { "error": false, "data": [...] }
/// { "error": "access denied" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(with = "error_flag")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// A success envelope carrying `data`.
    pub fn data(data: T) -> Self {
        Self {
            error: None,
            data: Some(data),
        }
    }

    /// A success envelope with no payload.
    pub fn ok() -> Self {
        Self {
            error: None,
            data: None,
        }
    }

    /// A failure envelope.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            data: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// `Option<String>` ⇄ `false | "message"`.
mod error_flag {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub(super) fn serialize<S: Serializer>(
        value: &Option<String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(message) => serializer.serialize_str(message),
            None => serializer.serialize_bool(false),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Message(String),
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        match Flag::deserialize(deserializer)? {
            Flag::Bool(false) => Ok(None),
            Flag::Bool(true) => {
                Err(D::Error::custom("error flag `true` carries no message"))
            }
            Flag::Message(message) => Ok(Some(message)),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
