//! Domain primitives, services, and ports.
//!
//! Purpose: define the identity and social-graph core (strongly typed
//! entities, the credential hasher and session token issuer, and the two
//! flow services) free of transport and storage concerns. Document
//! invariants in each type's Rustdoc.
//!
//! Public surface:
//! - `DomainError` / `ErrorCode` — transport-agnostic error envelope.
//! - `User`, `UserId`, `UserProfile` and friends — the user aggregate.
//! - `CredentialHasher` — one-way salted password hashing.
//! - `SessionTokenIssuer` / `SessionToken` — signed expiring sessions.
//! - `AuthService` — signup, login, logout, session validation.
//! - `RelationshipService` — follow/unfollow and symmetry reconciliation.

pub mod auth;
pub mod auth_service;
pub mod deadlines;
pub mod error;
pub mod follow_service;
pub mod password;
pub mod ports;
pub mod session;
pub mod user;

pub use self::auth::{AuthPayloadError, LoginCredentials, SignupRequest};
pub use self::auth_service::{AuthService, AuthenticatedUser};
pub use self::deadlines::OperationDeadlines;
pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use self::follow_service::{
    FollowOutcome, RelationshipService, SymmetryReport, SymmetryViolation, SymmetryViolationKind,
};
pub use self::password::{CredentialHasher, CryptoError, HashingCost};
pub use self::session::{
    IssuedSession, SessionToken, SessionTokenError, SessionTokenIssuer, MIN_SECRET_BYTES,
};
pub use self::user::{
    CredentialHash, DisplayName, Email, User, UserId, UserProfile, UserValidationError, Username,
};

/// Convenient result alias for flow services.
///
/// # Examples
/// ```
/// use backend::domain::{DomainError, DomainResult};
///
/// fn reject() -> DomainResult<()> {
///     Err(DomainError::unauthorized("invalid credentials"))
/// }
/// ```
pub type DomainResult<T> = Result<T, DomainError>;
