//! Authorization: "is this caller logged in AND do they hold this role?"

use warden_session::SessionRegistry;
use warden_store::CapabilityStore;

use crate::AccessError;

/// The role every privileged mutation requires.
pub const ADMIN_ROLE: &str = "ADMIN";

/// Combines the session registry and the capability store into one
/// access decision.
///
/// Borrowed for the length of one request; holds no state of its own.
pub struct Gatekeeper<'a, S> {
    registry: &'a SessionRegistry,
    store: &'a S,
}

impl<'a, S: CapabilityStore> Gatekeeper<'a, S> {
    pub fn new(registry: &'a SessionRegistry, store: &'a S) -> Self {
        Self { registry, store }
    }

    /// Checks that `email` has a live session matching `code` and that the
    /// stored user's role equals `required_role` exactly.
    ///
    /// The session check runs first; if it fails the store is never
    /// consulted. Validating does not renew the session.
    ///
    /// # Errors
    /// - [`AccessError::Unauthenticated`] if the session is absent,
    ///   expired, or the code does not match
    /// - [`AccessError::Unauthorized`] if the role differs or the user
    ///   can't be read
    pub async fn check(
        &self,
        email: &str,
        code: &str,
        required_role: &str,
    ) -> Result<(), AccessError> {
        if !self.registry.validate(email, code).await {
            tracing::debug!(%email, "access check failed: no live session");
            return Err(AccessError::Unauthenticated);
        }

        match self.store.find_user_by_email(email).await {
            Ok(user) if user.role == required_role => Ok(()),
            Ok(user) => {
                tracing::debug!(
                    %email,
                    role = %user.role,
                    required = required_role,
                    "access check failed: role mismatch"
                );
                Err(AccessError::Unauthorized)
            }
            Err(e) => {
                tracing::warn!(%email, error = %e, "access check could not load caller");
                Err(AccessError::Unauthorized)
            }
        }
    }

    /// [`check`](Self::check) collapsed to a yes/no.
    pub async fn authorize(
        &self,
        email: &str,
        code: &str,
        required_role: &str,
    ) -> bool {
        self.check(email, code, required_role).await.is_ok()
    }
}
