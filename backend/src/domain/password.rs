//! Credential hashing backed by Argon2id.
//!
//! Digests use the PHC string format, so the salt and cost parameters travel
//! with the digest and verification re-derives with exactly the parameters
//! the hash was created under. The final digest comparison does not
//! short-circuit on the first mismatching byte.

use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version};
use password_hash::{PasswordHash, SaltString};
use thiserror::Error;
use zeroize::Zeroizing;

use super::user::CredentialHash;

/// Failures raised by the credential hasher.
///
/// A wrong password is never an error; it is a normal `false` verification
/// result. These variants cover entropy, parameter, and computation faults
/// only, and all of them are safe to retry with backoff.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The operating system entropy source failed.
    #[error("entropy source failed: {message}")]
    Entropy { message: String },
    /// The configured cost parameters were rejected.
    #[error("invalid hashing parameters: {message}")]
    Parameters { message: String },
    /// Hashing or verification failed to compute.
    #[error("credential hashing failed: {message}")]
    Computation { message: String },
}

impl CryptoError {
    /// Helper for entropy failures.
    pub fn entropy(message: impl Into<String>) -> Self {
        Self::Entropy {
            message: message.into(),
        }
    }

    /// Helper for parameter rejections.
    pub fn parameters(message: impl Into<String>) -> Self {
        Self::Parameters {
            message: message.into(),
        }
    }

    /// Helper for computation failures.
    pub fn computation(message: impl Into<String>) -> Self {
        Self::Computation {
            message: message.into(),
        }
    }
}

/// Tunable Argon2id work factors.
///
/// Defaults follow the upstream recommendations (19 MiB, two passes, one
/// lane). Raising the memory cost is the preferred knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingCost {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes over the memory.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashingCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// One-way, salted credential hasher.
///
/// Hashing and verification run on the blocking thread pool; callers bound
/// them with the configured crypto deadline.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    /// Build a hasher from the given cost settings.
    pub fn new(cost: HashingCost) -> Result<Self, CryptoError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|err| CryptoError::parameters(err.to_string()))?;
        Ok(Self { params })
    }

    /// Hash a plaintext password under a fresh random salt.
    ///
    /// Two hashes of the same plaintext never collide because every call
    /// draws a new 16-byte salt from the operating system.
    pub async fn hash(&self, plaintext: &str) -> Result<CredentialHash, CryptoError> {
        let params = self.params.clone();
        let plaintext = Zeroizing::new(plaintext.to_owned());
        tokio::task::spawn_blocking(move || hash_blocking(params, &plaintext))
            .await
            .map_err(|err| CryptoError::computation(format!("hashing task aborted: {err}")))?
    }

    /// Verify a plaintext password against a stored digest.
    ///
    /// Returns `Ok(false)` on mismatch; errors are reserved for
    /// infrastructure faults.
    pub async fn verify(
        &self,
        plaintext: &str,
        digest: &CredentialHash,
    ) -> Result<bool, CryptoError> {
        let plaintext = Zeroizing::new(plaintext.to_owned());
        let digest = digest.clone();
        tokio::task::spawn_blocking(move || verify_blocking(&plaintext, &digest))
            .await
            .map_err(|err| CryptoError::computation(format!("verification task aborted: {err}")))?
    }
}

fn hash_blocking(params: Params, plaintext: &str) -> Result<CredentialHash, CryptoError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|err| CryptoError::entropy(err.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|err| CryptoError::entropy(err.to_string()))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let phc = argon2
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|err| CryptoError::computation(err.to_string()))?
        .to_string();
    Ok(CredentialHash::new(phc))
}

fn verify_blocking(plaintext: &str, digest: &CredentialHash) -> Result<bool, CryptoError> {
    let parsed = PasswordHash::new(digest.as_str())
        .map_err(|err| CryptoError::computation(format!("stored digest is malformed: {err}")))?;

    // Verification parameters come from the PHC string, not from this
    // hasher's configuration, so cost changes never invalidate old digests.
    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(CryptoError::computation(err.to_string())),
    }
}
