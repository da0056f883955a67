//! Authentication flow: signup, login, logout, and session validation.
//!
//! Orchestrates the credential hasher, the session token issuer, and the
//! credential store port. Every collaborator call is bounded by a deadline;
//! raw adapter and crypto errors never cross this boundary.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info};

use super::auth::{LoginCredentials, SignupRequest};
use super::deadlines::OperationDeadlines;
use super::error::DomainError;
use super::password::{CredentialHasher, CryptoError};
use super::ports::{CredentialStore, UserStoreError};
use super::session::{IssuedSession, SessionToken, SessionTokenError, SessionTokenIssuer};
use super::user::{User, UserId, UserProfile};

/// Message returned for every credential rejection.
///
/// Unknown username and wrong password must be indistinguishable to the
/// caller, so both paths share this exact string.
const INVALID_CREDENTIALS: &str = "invalid credentials";

const USER_ALREADY_EXISTS: &str = "an account with that email or username already exists";

/// Successful signup/login payload: the public view plus a fresh session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    /// Public projection of the authenticated user.
    pub profile: UserProfile,
    /// Newly issued session bound to that user.
    pub session: IssuedSession,
}

/// Authentication flow service over a [`CredentialStore`] adapter.
#[derive(Clone)]
pub struct AuthService<S> {
    store: Arc<S>,
    hasher: CredentialHasher,
    tokens: Arc<SessionTokenIssuer>,
    deadlines: OperationDeadlines,
}

impl<S> AuthService<S> {
    /// Create a new authentication service with its collaborators.
    pub fn new(
        store: Arc<S>,
        hasher: CredentialHasher,
        tokens: Arc<SessionTokenIssuer>,
        deadlines: OperationDeadlines,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            deadlines,
        }
    }
}

impl<S> AuthService<S>
where
    S: CredentialStore,
{
    /// Register a new user and issue its first session.
    ///
    /// The uniqueness pre-check and the store's unique-index enforcement at
    /// insert time surface as one identical conflict error, so a race
    /// between two signups is indistinguishable from a plain duplicate.
    pub async fn signup(&self, request: SignupRequest) -> Result<AuthenticatedUser, DomainError> {
        let existing = self
            .store_call(
                self.store
                    .find_by_email_or_username(request.email(), request.username()),
            )
            .await?;
        if existing.is_some() {
            debug!(username = %request.username(), "signup rejected: duplicate identity");
            return Err(DomainError::conflict(USER_ALREADY_EXISTS));
        }

        let (name, email, username, password) = request.into_parts();
        let credential = self.crypto_call(self.hasher.hash(&password)).await?;
        let user = User::signup(UserId::random(), name, email, username, credential);

        self.store_call(self.store.insert_user(&user)).await?;

        let session = self.issue_session(user.id())?;
        info!(user = %user.id(), "user signed up");
        Ok(AuthenticatedUser {
            profile: UserProfile::from(&user),
            session,
        })
    }

    /// Authenticate by username and password and issue a session.
    pub async fn login(
        &self,
        credentials: LoginCredentials,
    ) -> Result<AuthenticatedUser, DomainError> {
        let Some(user) = self
            .store_call(self.store.find_by_username(credentials.username()))
            .await?
        else {
            debug!("login rejected: unknown username");
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        };

        let verified = self
            .crypto_call(self.hasher.verify(credentials.password(), user.credential()))
            .await?;
        if !verified {
            debug!(user = %user.id(), "login rejected: credential mismatch");
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        }

        let session = self.issue_session(user.id())?;
        info!(user = %user.id(), "user logged in");
        Ok(AuthenticatedUser {
            profile: UserProfile::from(&user),
            session,
        })
    }

    /// Invalidate the caller's session.
    ///
    /// Tokens carry no server-side state, so dropping the token is the
    /// entire revocation; calling this without a live session still
    /// succeeds.
    pub fn logout(&self, token: Option<SessionToken>) -> Result<(), DomainError> {
        if token.is_some() {
            debug!("session token cleared");
        }
        Ok(())
    }

    /// Resolve a presented token to the user it is bound to.
    pub fn validate_session(&self, token: &SessionToken) -> Result<UserId, DomainError> {
        self.tokens.validate(token).map_err(map_token_error)
    }

    fn issue_session(&self, user_id: &UserId) -> Result<IssuedSession, DomainError> {
        self.tokens.issue(user_id).map_err(map_token_error)
    }

    async fn store_call<T, F>(&self, operation: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, UserStoreError>>,
    {
        match timeout(self.deadlines.store, operation).await {
            Ok(result) => result.map_err(map_store_error),
            Err(_) => Err(DomainError::persistence(
                "credential store deadline exceeded",
            )),
        }
    }

    async fn crypto_call<T, F>(&self, operation: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, CryptoError>>,
    {
        match timeout(self.deadlines.crypto, operation).await {
            Ok(result) => result.map_err(map_crypto_error),
            Err(_) => Err(DomainError::crypto_failure(
                "credential hashing deadline exceeded",
            )),
        }
    }
}

fn map_store_error(error: UserStoreError) -> DomainError {
    match error {
        UserStoreError::Connection { message } => {
            DomainError::persistence(format!("credential store unavailable: {message}"))
        }
        UserStoreError::Query { message } => {
            DomainError::persistence(format!("credential store error: {message}"))
        }
        // The index violation and the pre-check share one error surface.
        UserStoreError::DuplicateKey { .. } => DomainError::conflict(USER_ALREADY_EXISTS),
    }
}

fn map_crypto_error(error: CryptoError) -> DomainError {
    DomainError::crypto_failure(error.to_string())
}

fn map_token_error(error: SessionTokenError) -> DomainError {
    match error {
        SessionTokenError::Configuration { .. } | SessionTokenError::Signing { .. } => {
            DomainError::crypto_failure(error.to_string())
        }
        SessionTokenError::Invalid | SessionTokenError::Expired => {
            DomainError::unauthorized("invalid or expired session token")
        }
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
