//! Password hashing
//!
//! Argon2id with a fresh random salt per password, stored as a PHC string.

use crate::error::{KanbanError, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::Rng;

/// Raw salt length in bytes
const SALT_BYTES: usize = 16;

/// Hash a password, returning the PHC string
pub fn hash_password(password: &str) -> Result<String> {
    let mut bytes = [0u8; SALT_BYTES];
    rand::rng().fill(&mut bytes);
    let salt = SaltString::encode_b64(&bytes).map_err(|e| KanbanError::Credential {
        message: format!("failed to encode salt: {e}"),
    })?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| KanbanError::Credential {
            message: format!("failed to hash password: {e}"),
        })?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string
///
/// A mismatch is `InvalidCredentials`; a malformed stored hash is a `Credential` error.
pub fn verify_password(password: &str, password_hash: &str) -> Result<()> {
    let parsed = PasswordHash::new(password_hash).map_err(|e| KanbanError::Credential {
        message: format!("stored hash is malformed: {e}"),
    })?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| KanbanError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2"));
        verify_password("hunter22", &hash).unwrap();

        let err = verify_password("wrong", &hash).unwrap_err();
        assert!(matches!(err, KanbanError::InvalidCredentials));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }
}
