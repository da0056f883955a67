//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters.
//! Each trait exposes strongly typed errors so adapters map their failures
//! into predictable variants instead of returning `anyhow::Result`. Any
//! storage engine (relational, key-value, document) can sit behind
//! [`CredentialStore`] as long as it honours the unique-index and
//! idempotent set-mutation contracts.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use super::user::{Email, User, UserId, Username};

/// The relationship set a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipSide {
    /// The `followers` set of the addressed record.
    Followers,
    /// The `following` set of the addressed record.
    Following,
}

impl RelationshipSide {
    /// Field name as persisted by adapters.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Followers => "followers",
            Self::Following => "following",
        }
    }
}

impl fmt::Display for RelationshipSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unique secondary key an insert collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    /// The unique email index.
    Email,
    /// The unique username index.
    Username,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::Username => f.write_str("username"),
        }
    }
}

/// Errors raised by credential store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserStoreError {
    /// Store connection could not be established.
    #[error("credential store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("credential store query failed: {message}")]
    Query { message: String },
    /// The store's unique index rejected an insert.
    #[error("unique index violation on {field}")]
    DuplicateKey { field: UniqueField },
}

impl UserStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for unique index violations.
    pub fn duplicate_key(field: UniqueField) -> Self {
        Self::DuplicateKey { field }
    }
}

/// Persistence port for user records and their relationship sets.
///
/// Single-record mutations must be atomic within the adapter; the domain
/// never asks for a cross-record transaction. `add_to_set` and
/// `remove_from_set` must be idempotent membership operations, never blind
/// appends, so a retried or duplicated update cannot create a duplicate
/// membership or remove more than the addressed element.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a user matching either unique secondary key.
    async fn find_by_email_or_username(
        &self,
        email: &Email,
        username: &Username,
    ) -> Result<Option<User>, UserStoreError>;

    /// Look up a user by its unique login handle.
    async fn find_by_username(&self, username: &Username)
    -> Result<Option<User>, UserStoreError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError>;

    /// Insert a new user, enforcing the email/username unique indexes.
    async fn insert_user(&self, user: &User) -> Result<(), UserStoreError>;

    /// Idempotently insert `value` into one relationship set of `user`.
    async fn add_to_set(
        &self,
        user: &UserId,
        side: RelationshipSide,
        value: &UserId,
    ) -> Result<(), UserStoreError>;

    /// Idempotently remove `value` from one relationship set of `user`.
    async fn remove_from_set(
        &self,
        user: &UserId,
        side: RelationshipSide,
        value: &UserId,
    ) -> Result<(), UserStoreError>;

    /// Enumerate every stored user identifier.
    ///
    /// Feeds the symmetry audit; adapters may return identifiers in any
    /// order.
    async fn list_user_ids(&self) -> Result<Vec<UserId>, UserStoreError>;
}
