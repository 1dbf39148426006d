//! Error types for the protocol layer.
//!
//! Each crate in Warden defines its own error enum. A `ProtocolError`
//! always means a request or response could not be (de)serialized, never
//! that a session or a stored record was wrong.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, a missing required field,
    /// or a field of the wrong type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but breaks a protocol rule, e.g. an empty
    /// email on create-user.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
