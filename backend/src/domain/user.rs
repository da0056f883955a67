//! User aggregate and its value objects.
//!
//! Purpose: model the identity record the credential store persists. Value
//! objects enforce structural sanity only (non-empty, no surrounding
//! whitespace); stricter profile-field validation is out of scope. The
//! aggregate never implements `Serialize`; the only outward projection is
//! [`UserProfile`], which carries no credential material.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the user value-object constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyDisplayName,
    EmptyEmail,
    MalformedEmail,
    EmptyUsername,
    PaddedUsername,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::MalformedEmail => write!(f, "email must contain a local part and a domain"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::PaddedUsername => write!(f, "username must not contain surrounding whitespace"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
///
/// Opaque and immutable once created; ordering and hashing exist so
/// identifiers can live in relationship sets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        let uuid = Uuid::new_v4();
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Human readable display name for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`] from owned input.
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        Ok(Self(display_name))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unique email address used as a secondary lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`] from owned input.
    ///
    /// Only structural sanity is checked: the address must be non-blank and
    /// split into a local part and a domain around a single `@`.
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        let well_formed = {
            let mut parts = email.split('@');
            matches!(
                (parts.next(), parts.next(), parts.next()),
                (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
            )
        };
        if !well_formed {
            return Err(UserValidationError::MalformedEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unique login handle used for credential lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`] from owned input.
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        let username = username.into();
        if username.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if username.trim() != username {
            return Err(UserValidationError::PaddedUsername);
        }
        Ok(Self(username))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// One-way salted credential digest in PHC string format.
///
/// The PHC encoding carries the digest, the per-call salt, and the cost
/// parameters needed for reverification. The type deliberately implements
/// neither `Serialize` nor `Display`, and its `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialHash(String);

impl CredentialHash {
    /// Wrap an already-encoded PHC string.
    pub fn new(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Borrow the PHC-encoded digest for verification.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialHash(..)")
    }
}

/// Application user persisted by the credential store.
///
/// ## Invariants
/// - `email` and `username` are unique across all users; the store's
///   unique-index contract enforces this at insert time.
/// - `followers` and `following` never contain the owning user's id.
/// - Symmetry with peer records is maintained by the relationship service,
///   not by this type.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    name: DisplayName,
    email: Email,
    username: Username,
    credential: CredentialHash,
    bio: Option<String>,
    profile_pic: Option<String>,
    followers: BTreeSet<UserId>,
    following: BTreeSet<UserId>,
}

impl User {
    /// Build the record signup persists: validated identity fields, a hashed
    /// credential, and empty relationship sets.
    pub fn signup(
        id: UserId,
        name: DisplayName,
        email: Email,
        username: Username,
        credential: CredentialHash,
    ) -> Self {
        Self {
            id,
            name,
            email,
            username,
            credential,
            bio: None,
            profile_pic: None,
            followers: BTreeSet::new(),
            following: BTreeSet::new(),
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name shown to other users.
    pub fn display_name(&self) -> &DisplayName {
        &self.name
    }

    /// Unique email address.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Unique login handle.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Stored credential digest.
    pub fn credential(&self) -> &CredentialHash {
        &self.credential
    }

    /// Optional biography text.
    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    /// Optional profile picture reference.
    pub fn profile_pic(&self) -> Option<&str> {
        self.profile_pic.as_deref()
    }

    /// Identifiers of users following this user.
    pub fn followers(&self) -> &BTreeSet<UserId> {
        &self.followers
    }

    /// Identifiers of users this user follows.
    pub fn following(&self) -> &BTreeSet<UserId> {
        &self.following
    }

    /// Whether this user currently follows `other`.
    pub fn is_following(&self, other: &UserId) -> bool {
        self.following.contains(other)
    }

    /// Idempotent set insertion applied by store adapters.
    ///
    /// Returns whether the membership changed.
    pub fn insert_follower(&mut self, id: UserId) -> bool {
        self.followers.insert(id)
    }

    /// Idempotent set removal applied by store adapters.
    ///
    /// Returns whether the membership changed.
    pub fn remove_follower(&mut self, id: &UserId) -> bool {
        self.followers.remove(id)
    }

    /// Idempotent set insertion applied by store adapters.
    ///
    /// Returns whether the membership changed.
    pub fn insert_following(&mut self, id: UserId) -> bool {
        self.following.insert(id)
    }

    /// Idempotent set removal applied by store adapters.
    ///
    /// Returns whether the membership changed.
    pub fn remove_following(&mut self, id: &UserId) -> bool {
        self.following.remove(id)
    }
}

/// Public projection of a [`User`] returned to the transport layer.
///
/// Mirrors the signup/login response shape; the credential digest has no
/// representation here by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct UserProfile {
    /// Stable user identifier.
    pub id: UserId,
    /// Display name shown to other users.
    pub name: String,
    /// Unique email address.
    pub email: String,
    /// Unique login handle.
    pub username: String,
    /// Optional biography text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Optional profile picture reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.to_string(),
            email: user.email.to_string(),
            username: user.username.to_string(),
            bio: user.bio.clone(),
            profile_pic: user.profile_pic.clone(),
        }
    }
}
