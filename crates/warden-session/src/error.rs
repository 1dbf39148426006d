//! Error types for the session layer.

/// Errors raised by the credential collaborator.
///
/// The session registry itself never fails: issuing, renewing, and
/// validating are pure in-memory operations. Only hashing can go wrong.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The hasher could not produce or check a digest (bad parameters,
    /// internal failure).
    #[error("password hashing failed: {0}")]
    HashFailed(String),

    /// A stored digest is not a parseable PHC string. The stored record
    /// is corrupt; this is not the same as a wrong password.
    #[error("stored password digest is malformed: {0}")]
    MalformedDigest(String),
}
