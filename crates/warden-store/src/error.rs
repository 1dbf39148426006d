//! Error types for the store layer.

/// Errors that can occur during store operations.
///
/// Not-found and conflict are domain conditions the caller reports to
/// the client. `Backend` means the store itself failed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No user with this email.
    #[error("user {0} not found")]
    UserNotFound(String),

    /// No role with this name.
    #[error("role {0} not found")]
    RoleNotFound(String),

    /// A user with this email already exists.
    #[error("a user with email {0} already exists")]
    DuplicateUser(String),

    /// A role with this name already exists.
    #[error("a role named {0} already exists")]
    DuplicateRole(String),

    /// The backend failed (connection lost, corrupt data, ...).
    #[error("store backend failed: {0}")]
    Backend(String),
}

impl StoreError {
    /// `true` for [`UserNotFound`](Self::UserNotFound) and
    /// [`RoleNotFound`](Self::RoleNotFound).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::RoleNotFound(_))
    }

    /// `true` for duplicate-key failures on create.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::DuplicateUser(_) | Self::DuplicateRole(_))
    }
}
