//! Signed, expiring session tokens.
//!
//! A token carries the user identifier as its only claim. Validation is a
//! pure function of the token bytes and the current time; no server-side
//! session state exists, so revocation is the caller clearing its stored
//! token and expiry is the only server-enforced bound on lifetime.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::user::UserId;

/// Minimum accepted signing secret length in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

/// Failures raised when issuing or validating session tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionTokenError {
    /// The issuer was built with unusable key material or TTL.
    #[error("session token configuration invalid: {message}")]
    Configuration { message: String },
    /// Signing the claims failed.
    #[error("session token signing failed: {message}")]
    Signing { message: String },
    /// The token signature or shape was rejected.
    #[error("invalid session token")]
    Invalid,
    /// The token expiry has passed.
    #[error("expired session token")]
    Expired,
}

impl SessionTokenError {
    /// Helper for configuration failures.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Helper for signing failures.
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }
}

/// Opaque bearer credential proving prior successful authentication.
///
/// `Debug` output is redacted so tokens never leak into logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap an encoded token received from a client.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the encoded token for transport.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// A freshly issued session with its validity window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedSession {
    /// The signed bearer token.
    pub token: SessionToken,
    /// The user the token is bound to.
    pub user_id: UserId,
    /// Issuance instant.
    pub issued_at: DateTime<Utc>,
    /// Expiry instant; validation rejects the token afterwards.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Mints and validates HS256-signed session tokens.
pub struct SessionTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionTokenIssuer {
    /// Build an issuer from a signing secret and token lifetime.
    ///
    /// Secrets shorter than [`MIN_SECRET_BYTES`] are rejected outright
    /// rather than silently weakening every token signed with them.
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, SessionTokenError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(SessionTokenError::configuration(format!(
                "signing secret must be at least {MIN_SECRET_BYTES} bytes"
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    /// Mint a token bound to `user_id`, expiring after the configured TTL.
    pub fn issue(&self, user_id: &UserId) -> Result<IssuedSession, SessionTokenError> {
        let issued_at = Utc::now();
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| SessionTokenError::signing(err.to_string()))?;

        Ok(IssuedSession {
            token: SessionToken::new(token),
            user_id: user_id.clone(),
            issued_at,
            expires_at,
        })
    }

    /// Verify signature and expiry, returning the bound user identifier.
    pub fn validate(&self, token: &SessionToken) -> Result<UserId, SessionTokenError> {
        let data: TokenData<Claims> = decode(token.as_str(), &self.decoding, &self.validation)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => SessionTokenError::Expired,
                _ => SessionTokenError::Invalid,
            })?;

        UserId::new(&data.claims.sub).map_err(|_| SessionTokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;
    use rstest::rstest;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn issuer(ttl: Duration) -> SessionTokenIssuer {
        SessionTokenIssuer::new(SECRET, ttl).expect("valid issuer settings")
    }

    #[rstest]
    fn short_secrets_are_rejected() {
        let err = SessionTokenIssuer::new(b"too-short", Duration::hours(1))
            .expect_err("short secrets must fail");
        assert!(matches!(err, SessionTokenError::Configuration { .. }));
    }

    #[rstest]
    fn issued_tokens_validate_back_to_the_same_user() {
        let issuer = issuer(Duration::hours(1));
        let user_id = UserId::random();

        let session = issuer.issue(&user_id).expect("issuance succeeds");
        assert_eq!(session.user_id, user_id);
        assert!(session.expires_at > session.issued_at);

        let validated = issuer.validate(&session.token).expect("validation succeeds");
        assert_eq!(validated, user_id);
    }

    #[rstest]
    fn expired_tokens_are_rejected() {
        let issuer = issuer(Duration::seconds(-60));
        let session = issuer.issue(&UserId::random()).expect("issuance succeeds");

        let err = issuer
            .validate(&session.token)
            .expect_err("expired tokens must fail");
        assert_eq!(err, SessionTokenError::Expired);
    }

    #[rstest]
    fn tampered_tokens_are_rejected() {
        let issuer = issuer(Duration::hours(1));
        let session = issuer.issue(&UserId::random()).expect("issuance succeeds");

        let parts: Vec<&str> = session.token.as_str().split('.').collect();
        let forged_claims = "eyJzdWIiOiJmb3JnZWQiLCJpYXQiOjAsImV4cCI6OTk5OTk5OTk5OX0";
        let raw = format!("{}.{}.{}", parts[0], forged_claims, parts[2]);

        let err = issuer
            .validate(&SessionToken::new(raw))
            .expect_err("tampered tokens must fail");
        assert_eq!(err, SessionTokenError::Invalid);
    }

    #[rstest]
    fn tokens_from_another_key_are_rejected() {
        let issuer_a = issuer(Duration::hours(1));
        let issuer_b =
            SessionTokenIssuer::new(b"ffffffffffffffffffffffffffffffff", Duration::hours(1))
                .expect("valid issuer settings");

        let session = issuer_b
            .issue(&UserId::random())
            .expect("issuance succeeds");
        let err = issuer_a
            .validate(&session.token)
            .expect_err("foreign signatures must fail");
        assert_eq!(err, SessionTokenError::Invalid);
    }

    #[rstest]
    fn token_debug_output_is_redacted() {
        let issuer = issuer(Duration::hours(1));
        let session = issuer.issue(&UserId::random()).expect("issuance succeeds");
        assert_eq!(format!("{:?}", session.token), "SessionToken(..)");
    }
}
