//! Password encoding for the credential file
//!
//! Stored passwords are either legacy plaintext or Argon2id PHC strings.
//! Verification accepts both, so a file written by an older deployment keeps
//! working after hashing is switched on.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use super::errors::CredentialError;
use crate::Result;

/// Prefix of every Argon2 PHC string.
const ARGON2_PREFIX: &str = "$argon2";

/// How newly written passwords are encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStorage {
    /// Store the password as typed. File-compatible with older deployments.
    Plaintext,
    /// Store an Argon2id hash in PHC format
    #[default]
    Argon2,
}

impl PasswordStorage {
    /// Encode a password for storage.
    pub fn encode(self, password: &str) -> Result<String> {
        match self {
            PasswordStorage::Plaintext => Ok(password.to_string()),
            PasswordStorage::Argon2 => hash_password(password),
        }
    }
}

/// Hash a password using Argon2id, returning the PHC string.
pub fn hash_password(password: impl AsRef<str>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_ref().as_bytes(), &salt)
        .map_err(|e| CredentialError::PasswordHash {
            reason: e.to_string(),
        })?
        .to_string();

    Ok(password_hash)
}

/// Whether a stored value is an Argon2 hash rather than plaintext.
pub fn is_hashed(stored: &str) -> bool {
    stored.starts_with(ARGON2_PREFIX)
}

/// Check a typed password against its stored form.
///
/// Plaintext entries compare exactly (case-sensitive). A stored value that
/// looks like a PHC string but fails to parse never matches.
pub fn verify_password(password: &str, stored: &str) -> bool {
    if !is_hashed(stored) {
        return password == stored;
    }

    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is not valid PHC: {e}");
            false
        }
    }
}
