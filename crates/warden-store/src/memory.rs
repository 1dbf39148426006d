//! In-process [`CapabilityStore`].
//!
//! Two maps behind `RwLock`s. Check-and-insert happens under one write
//! guard, so two concurrent creates of the same key cannot both succeed.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tokio::sync::RwLock;
use warden_protocol::{PublicUser, Role, RoleConfig, User};

use crate::{CapabilityStore, StoreError};

/// Users keyed by email, roles keyed by name. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    roles: RwLock<HashMap<String, Role>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CapabilityStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .get(email)
            .cloned()
            .ok_or_else(|| StoreError::UserNotFound(email.to_string()))
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Role, StoreError> {
        self.roles
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::RoleNotFound(name.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<PublicUser>, StoreError> {
        let mut users: Vec<PublicUser> = self
            .users
            .read()
            .await
            .values()
            .map(User::to_public)
            .collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn list_roles(&self) -> Result<Vec<Role>, StoreError> {
        let mut roles: Vec<Role> =
            self.roles.read().await.values().cloned().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn insert_user(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        match users.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateUser(user.email)),
            Entry::Vacant(slot) => {
                tracing::info!(email = %user.email, role = %user.role, "user created");
                slot.insert(user);
                Ok(())
            }
        }
    }

    async fn insert_role(&self, name: &str) -> Result<Role, StoreError> {
        let mut roles = self.roles.write().await;
        match roles.entry(name.to_string()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateRole(name.to_string())),
            Entry::Vacant(slot) => {
                tracing::info!(role = name, "role created");
                Ok(slot.insert(Role::new(name)).clone())
            }
        }
    }

    async fn update_user_role(
        &self,
        email: &str,
        role: &str,
    ) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(email)
            .ok_or_else(|| StoreError::UserNotFound(email.to_string()))?;
        user.role = role.to_string();
        tracing::info!(%email, %role, "user role updated");
        Ok(())
    }

    async fn update_role_config(
        &self,
        name: &str,
        config: RoleConfig,
    ) -> Result<(), StoreError> {
        let mut roles = self.roles.write().await;
        let role = roles
            .get_mut(name)
            .ok_or_else(|| StoreError::RoleNotFound(name.to_string()))?;
        role.config = config;
        tracing::info!(role = name, capabilities = role.config.len(), "role configured");
        Ok(())
    }

    async fn delete_user(&self, email: &str) -> Result<(), StoreError> {
        self.users
            .write()
            .await
            .remove(email)
            .map(|_| tracing::info!(%email, "user deleted"))
            .ok_or_else(|| StoreError::UserNotFound(email.to_string()))
    }

    async fn delete_role(&self, name: &str) -> Result<(), StoreError> {
        self.roles
            .write()
            .await
            .remove(name)
            .map(|_| tracing::info!(role = name, "role deleted"))
            .ok_or_else(|| StoreError::RoleNotFound(name.to_string()))
    }
}
