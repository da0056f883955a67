//! Relationship manager: the follow/unfollow state transition.
//!
//! The two record mutations inside a toggle are not wrapped in a
//! cross-record transaction. The target's `followers` set is always written
//! first and is the source of truth; if the second write fails the flow
//! surfaces a retriable error and the asymmetry stays detectable by the
//! audit pass, which re-derives `following` membership from the `followers`
//! side.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::time::timeout;
use tracing::{info, warn};

use super::deadlines::OperationDeadlines;
use super::error::DomainError;
use super::ports::{CredentialStore, RelationshipSide, UserStoreError};
use super::user::{User, UserId};

/// Terminal state reached by a follow/unfollow toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowOutcome {
    /// The actor now follows the target.
    Followed,
    /// The actor no longer follows the target.
    Unfollowed,
}

impl FollowOutcome {
    /// Status label as exposed to the transport layer.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Followed => "followed",
            Self::Unfollowed => "unfollowed",
        }
    }
}

/// How a pair of records violates the symmetry invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymmetryViolationKind {
    /// `peer.followers` names the user, but the user's `following` set does
    /// not name the peer. Repair inserts the missing membership.
    MissingFollowing,
    /// The user's `following` set names the peer, but `peer.followers` does
    /// not name the user. Repair removes the stale membership.
    DanglingFollowing,
}

/// A single detected violation of the symmetry invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymmetryViolation {
    /// Owner of the `following` set that needs correcting.
    pub user: UserId,
    /// The peer whose `followers` set is taken as truth.
    pub peer: UserId,
    /// Direction of the inconsistency.
    pub kind: SymmetryViolationKind,
}

/// Result of a symmetry audit or repair pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymmetryReport {
    /// Number of user records scanned.
    pub scanned: usize,
    /// Violations found (and, after a repair pass, corrected).
    pub violations: Vec<SymmetryViolation>,
}

impl SymmetryReport {
    /// Whether the scan found the graph fully symmetric.
    pub fn is_consistent(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Relationship service over a [`CredentialStore`] adapter.
#[derive(Clone)]
pub struct RelationshipService<S> {
    store: Arc<S>,
    deadlines: OperationDeadlines,
}

impl<S> RelationshipService<S> {
    /// Create a new relationship service over the credential store.
    pub fn new(store: Arc<S>, deadlines: OperationDeadlines) -> Self {
        Self { store, deadlines }
    }
}

impl<S> RelationshipService<S>
where
    S: CredentialStore,
{
    /// Toggle the follow relationship between `actor` and `target`.
    ///
    /// The toggle decision is read-then-act: two concurrent opposite calls
    /// for the same pair settle in one of the two terminal states. Because
    /// both mutations are idempotent set operations, no interleaving can
    /// corrupt a relationship set.
    pub async fn follow_unfollow(
        &self,
        actor_id: &UserId,
        target_id: &UserId,
    ) -> Result<FollowOutcome, DomainError> {
        if actor_id == target_id {
            return Err(DomainError::invalid_request(
                "users cannot follow or unfollow themselves",
            ));
        }

        let actor = self
            .store_call(self.store.find_by_id(actor_id))
            .await?
            .ok_or_else(|| DomainError::not_found(format!("user {actor_id} not found")))?;
        if self
            .store_call(self.store.find_by_id(target_id))
            .await?
            .is_none()
        {
            return Err(DomainError::not_found(format!(
                "user {target_id} not found"
            )));
        }

        // Target's followers set first: it is the side the audit trusts.
        if actor.is_following(target_id) {
            self.store_call(self.store.remove_from_set(
                target_id,
                RelationshipSide::Followers,
                actor_id,
            ))
            .await?;
            self.mirror_on_actor(
                actor_id,
                target_id,
                self.store_call(self.store.remove_from_set(
                    actor_id,
                    RelationshipSide::Following,
                    target_id,
                )),
            )
            .await?;
            info!(actor = %actor_id, target = %target_id, "unfollowed");
            Ok(FollowOutcome::Unfollowed)
        } else {
            self.store_call(self.store.add_to_set(
                target_id,
                RelationshipSide::Followers,
                actor_id,
            ))
            .await?;
            self.mirror_on_actor(
                actor_id,
                target_id,
                self.store_call(self.store.add_to_set(
                    actor_id,
                    RelationshipSide::Following,
                    target_id,
                )),
            )
            .await?;
            info!(actor = %actor_id, target = %target_id, "followed");
            Ok(FollowOutcome::Followed)
        }
    }

    /// Await the actor-side mutation, flagging the asymmetry if it fails
    /// after the follower side has already been applied.
    async fn mirror_on_actor<F>(
        &self,
        actor_id: &UserId,
        target_id: &UserId,
        operation: F,
    ) -> Result<(), DomainError>
    where
        F: Future<Output = Result<(), DomainError>>,
    {
        if let Err(error) = operation.await {
            warn!(
                actor = %actor_id,
                target = %target_id,
                "follower-side update applied but following-side update failed; \
                 asymmetry awaits the repair pass"
            );
            return Err(error);
        }
        Ok(())
    }

    /// Scan every user record and report symmetry violations.
    ///
    /// Runs against a record-by-record snapshot; concurrent toggles may
    /// surface transient findings that the next pass no longer sees.
    pub async fn audit_symmetry(&self) -> Result<SymmetryReport, DomainError> {
        let users = self.load_all_users().await?;

        let mut violations = Vec::new();
        for (id, user) in &users {
            for follower_id in user.followers() {
                match users.get(follower_id) {
                    Some(follower) if follower.is_following(id) => {}
                    Some(_) => violations.push(SymmetryViolation {
                        user: follower_id.clone(),
                        peer: id.clone(),
                        kind: SymmetryViolationKind::MissingFollowing,
                    }),
                    None => {
                        warn!(user = %id, follower = %follower_id, "follower references an unknown user");
                    }
                }
            }
            for followed_id in user.following() {
                match users.get(followed_id) {
                    Some(followed) if followed.followers().contains(id) => {}
                    Some(_) => violations.push(SymmetryViolation {
                        user: id.clone(),
                        peer: followed_id.clone(),
                        kind: SymmetryViolationKind::DanglingFollowing,
                    }),
                    None => {
                        warn!(user = %id, followed = %followed_id, "following references an unknown user");
                    }
                }
            }
        }

        Ok(SymmetryReport {
            scanned: users.len(),
            violations,
        })
    }

    /// Audit the graph and correct every violation found.
    ///
    /// The `followers` side is authoritative because it is written first;
    /// repair only ever touches `following` sets, with the same idempotent
    /// mutations the toggle uses.
    pub async fn repair_symmetry(&self) -> Result<SymmetryReport, DomainError> {
        let report = self.audit_symmetry().await?;

        for violation in &report.violations {
            match violation.kind {
                SymmetryViolationKind::MissingFollowing => {
                    self.store_call(self.store.add_to_set(
                        &violation.user,
                        RelationshipSide::Following,
                        &violation.peer,
                    ))
                    .await?;
                }
                SymmetryViolationKind::DanglingFollowing => {
                    self.store_call(self.store.remove_from_set(
                        &violation.user,
                        RelationshipSide::Following,
                        &violation.peer,
                    ))
                    .await?;
                }
            }
            info!(
                user = %violation.user,
                peer = %violation.peer,
                kind = ?violation.kind,
                "symmetry violation repaired"
            );
        }

        Ok(report)
    }

    async fn load_all_users(&self) -> Result<HashMap<UserId, User>, DomainError> {
        let ids = self.store_call(self.store.list_user_ids()).await?;

        let mut users = HashMap::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = self.store_call(self.store.find_by_id(&id)).await? {
                users.insert(id, user);
            }
        }
        Ok(users)
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
}

fn map_store_error(error: UserStoreError) -> DomainError {
    match error {
        UserStoreError::Connection { message } => {
            DomainError::persistence(format!("credential store unavailable: {message}"))
        }
        UserStoreError::Query { message } => {
            DomainError::persistence(format!("credential store error: {message}"))
        }
        UserStoreError::DuplicateKey { field } => {
            DomainError::persistence(format!("unexpected unique index violation on {field}"))
        }
    }
}

#[cfg(test)]
#[path = "follow_service_tests.rs"]
mod tests;
