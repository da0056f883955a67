//! Process-wide authentication settings loaded via OrthoConfig.
//!
//! Every knob the flows need (signing secret, token lifetime, hashing cost,
//! operation deadlines) is resolved here once at startup and injected
//! explicitly into the services; nothing reads ambient state afterwards.

use std::time::Duration as StdDuration;

use chrono::Duration;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{
    CredentialHasher, CryptoError, HashingCost, OperationDeadlines, SessionTokenError,
    SessionTokenIssuer,
};

const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_CRYPTO_TIMEOUT_MS: u64 = 2_000;

/// Configuration values for the authentication and relationship flows.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "AUTH")]
pub struct AuthSettings {
    /// Secret used to sign session tokens; required, at least 32 bytes.
    pub token_secret: Option<String>,
    /// Session token lifetime in seconds.
    pub token_ttl_secs: Option<i64>,
    /// Argon2 memory cost in KiB.
    pub hash_memory_kib: Option<u32>,
    /// Argon2 pass count.
    pub hash_iterations: Option<u32>,
    /// Argon2 lane count.
    pub hash_parallelism: Option<u32>,
    /// Deadline for a single credential store call, in milliseconds.
    pub store_timeout_ms: Option<u64>,
    /// Deadline for a single hashing call, in milliseconds.
    pub crypto_timeout_ms: Option<u64>,
}

impl AuthSettings {
    /// Return the configured token lifetime, falling back to one day.
    pub fn token_ttl(&self) -> Duration {
        Duration::seconds(self.token_ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL_SECS))
    }

    /// Return the configured hashing cost, falling back to the Argon2
    /// defaults for any unset knob.
    pub fn hashing_cost(&self) -> HashingCost {
        let defaults = HashingCost::default();
        HashingCost {
            memory_kib: self.hash_memory_kib.unwrap_or(defaults.memory_kib),
            iterations: self.hash_iterations.unwrap_or(defaults.iterations),
            parallelism: self.hash_parallelism.unwrap_or(defaults.parallelism),
        }
    }

    /// Return the per-operation deadlines for collaborator calls.
    pub fn deadlines(&self) -> OperationDeadlines {
        OperationDeadlines {
            store: StdDuration::from_millis(
                self.store_timeout_ms.unwrap_or(DEFAULT_STORE_TIMEOUT_MS),
            ),
            crypto: StdDuration::from_millis(
                self.crypto_timeout_ms.unwrap_or(DEFAULT_CRYPTO_TIMEOUT_MS),
            ),
        }
    }

    /// Build the session token issuer from the configured secret and TTL.
    pub fn session_token_issuer(&self) -> Result<SessionTokenIssuer, SessionTokenError> {
        let secret = self.token_secret.as_deref().ok_or_else(|| {
            SessionTokenError::configuration("AUTH_TOKEN_SECRET must be set")
        })?;
        SessionTokenIssuer::new(secret.as_bytes(), self.token_ttl())
    }

    /// Build the credential hasher from the configured cost.
    pub fn credential_hasher(&self) -> Result<CredentialHasher, CryptoError> {
        CredentialHasher::new(self.hashing_cost())
    }
}
