//! The `CapabilityStore` trait: the persistence seam.

use std::future::Future;

use warden_protocol::{PublicUser, Role, RoleConfig, User};

use crate::StoreError;

/// Create / find / update / delete over `User` (keyed by email) and
/// `Role` (keyed by name).
///
/// Every method makes one attempt and reports failure as-is; retrying is
/// not the store's job. Futures are `Send` because handlers await them
/// on a multi-threaded runtime.
pub trait CapabilityStore: Send + Sync + 'static {
    /// # Errors
    /// [`StoreError::UserNotFound`] if no user has this email.
    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<User, StoreError>> + Send;

    /// # Errors
    /// [`StoreError::RoleNotFound`] if no role has this name.
    fn find_role_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Role, StoreError>> + Send;

    /// Every user, without password digests, ordered by email.
    fn list_users(
        &self,
    ) -> impl Future<Output = Result<Vec<PublicUser>, StoreError>> + Send;

    /// Every role, ordered by name.
    fn list_roles(
        &self,
    ) -> impl Future<Output = Result<Vec<Role>, StoreError>> + Send;

    /// Stores a new user. `user.password` must already be a digest.
    ///
    /// # Errors
    /// [`StoreError::DuplicateUser`] if the email is taken; the existing
    /// user is left untouched.
    fn insert_user(
        &self,
        user: User,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Creates a role with an empty capability map and returns it.
    ///
    /// # Errors
    /// [`StoreError::DuplicateRole`] if the name is taken; the existing
    /// role's config is left untouched.
    fn insert_role(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Role, StoreError>> + Send;

    /// Sets the role name of the user `email`.
    ///
    /// # Errors
    /// [`StoreError::UserNotFound`] if no user has this email.
    fn update_user_role(
        &self,
        email: &str,
        role: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Replaces the whole capability map of role `name`.
    ///
    /// # Errors
    /// [`StoreError::RoleNotFound`] if no role has this name.
    fn update_role_config(
        &self,
        name: &str,
        config: RoleConfig,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// # Errors
    /// [`StoreError::UserNotFound`] if no user has this email.
    fn delete_user(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// # Errors
    /// [`StoreError::RoleNotFound`] if no role has this name.
    fn delete_role(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
