//! In-memory credential store adapter.
//!
//! Backs tests and single-process deployments. Every mutation holds the
//! write lock for the whole update, so each single-record change is atomic
//! exactly as the port contract requires; nothing here spans two records.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{CredentialStore, RelationshipSide, UniqueField, UserStoreError};
use crate::domain::user::{Email, User, UserId, Username};

/// Hash-map backed [`CredentialStore`] with unique-index semantics.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email_or_username(
        &self,
        email: &Email,
        username: &Username,
    ) -> Result<Option<User>, UserStoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.email() == email || user.username() == username)
            .cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserStoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.username() == username)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;

        if users.values().any(|stored| stored.email() == user.email()) {
            return Err(UserStoreError::duplicate_key(UniqueField::Email));
        }
        if users
            .values()
            .any(|stored| stored.username() == user.username())
        {
            return Err(UserStoreError::duplicate_key(UniqueField::Username));
        }
        if users.contains_key(user.id()) {
            return Err(UserStoreError::query(format!(
                "user {} already present",
                user.id()
            )));
        }

        users.insert(user.id().clone(), user.clone());
        Ok(())
    }

    async fn add_to_set(
        &self,
        user: &UserId,
        side: RelationshipSide,
        value: &UserId,
    ) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        let record = users
            .get_mut(user)
            .ok_or_else(|| UserStoreError::query(format!("unknown user {user}")))?;

        match side {
            RelationshipSide::Followers => record.insert_follower(value.clone()),
            RelationshipSide::Following => record.insert_following(value.clone()),
        };
        Ok(())
    }

    async fn remove_from_set(
        &self,
        user: &UserId,
        side: RelationshipSide,
        value: &UserId,
    ) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        let record = users
            .get_mut(user)
            .ok_or_else(|| UserStoreError::query(format!("unknown user {user}")))?;

        match side {
            RelationshipSide::Followers => record.remove_follower(value),
            RelationshipSide::Following => record.remove_following(value),
        };
        Ok(())
    }

    async fn list_user_ids(&self) -> Result<Vec<UserId>, UserStoreError> {
        let users = self.users.read().await;
        let mut ids: Vec<UserId> = users.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
