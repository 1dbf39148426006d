//! Credential verification: the one-way password hash.
//!
//! Warden never stores or compares plaintext passwords. It asks a
//! [`CredentialVerifier`] to turn a password into a digest at account
//! creation, and to check a password against that digest at login.
//!
//! The production implementation is [`Argon2Verifier`]. Tests that create
//! many accounts can build one with cheap parameters via
//! [`Argon2Verifier::with_params`].

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::SessionError;

/// One-way password hashing.
///
/// # Trait bounds
///
/// - `Send + Sync` → one verifier is shared by every request handler and
///   called from blocking worker threads.
/// - `'static` → it lives as long as the server.
///
/// # Example
///
/// ```rust
/// use warden_session::{Argon2Verifier, CredentialVerifier};
///
/// let verifier = Argon2Verifier::default();
/// let digest = verifier.hash("correct horse").unwrap();
///
/// assert!(verifier.verify("correct horse", &digest).unwrap());
/// assert!(!verifier.verify("battery staple", &digest).unwrap());
/// ```
pub trait CredentialVerifier: Send + Sync + 'static {
    /// Hashes `plaintext` with a fresh random salt.
    ///
    /// # Errors
    /// [`SessionError::HashFailed`] if the hasher rejects its input or
    /// parameters.
    fn hash(&self, plaintext: &str) -> Result<String, SessionError>;

    /// Checks `plaintext` against a digest previously returned by
    /// [`hash`](Self::hash).
    ///
    /// # Returns
    /// - `Ok(true)` — the password matches
    /// - `Ok(false)` — it does not
    ///
    /// # Errors
    /// [`SessionError::MalformedDigest`] if `digest` can't be parsed,
    /// [`SessionError::HashFailed`] for any other hasher failure.
    fn verify(
        &self,
        plaintext: &str,
        digest: &str,
    ) -> Result<bool, SessionError>;
}

/// Argon2id, producing PHC-format strings (`$argon2id$v=19$...`).
///
/// The digest embeds its own parameters, so a verifier built with
/// different parameters can still check it.
#[derive(Debug, Clone, Default)]
pub struct Argon2Verifier {
    argon2: Argon2<'static>,
}

impl Argon2Verifier {
    /// Argon2id with explicit cost parameters.
    ///
    /// - `m_cost` — memory in KiB (at least `8 * p_cost`)
    /// - `t_cost` — iterations
    /// - `p_cost` — lanes
    ///
    /// # Errors
    /// [`SessionError::HashFailed`] if the parameters are out of range.
    pub fn with_params(
        m_cost: u32,
        t_cost: u32,
        p_cost: u32,
    ) -> Result<Self, SessionError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| SessionError::HashFailed(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl CredentialVerifier for Argon2Verifier {
    fn hash(&self, plaintext: &str) -> Result<String, SessionError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|e| SessionError::HashFailed(e.to_string()))
    }

    fn verify(
        &self,
        plaintext: &str,
        digest: &str,
    ) -> Result<bool, SessionError> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| SessionError::MalformedDigest(e.to_string()))?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(SessionError::HashFailed(e.to_string())),
        }
    }
}
