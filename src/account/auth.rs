//! Secret hashing and verification tokens

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

/// Bytes of entropy in a verification token (128 bits)
const TOKEN_BYTES: usize = 16;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("failed to hash secret")]
    HashFailed,
    #[error("stored secret hash is malformed")]
    MalformedHash,
    #[error("secret does not match")]
    InvalidSecret,
}

/// Hash a secret using Argon2id with a random salt
pub fn hash_secret(secret: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::HashFailed)
}

/// Verify a secret against a stored hash
pub fn verify_secret(secret: &str, secret_hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(secret_hash).map_err(|_| AuthError::MalformedHash)?;

    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidSecret)
}

/// Generate an unguessable email verification token (hex encoded)
pub fn generate_verification_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_hashing() {
        let hash = hash_secret("pw1").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_secret("pw1", &hash).is_ok());
        assert_eq!(verify_secret("wrong", &hash), Err(AuthError::InvalidSecret));
    }

    #[test]
    fn test_hash_is_salted() {
        assert_ne!(hash_secret("pw1").unwrap(), hash_secret("pw1").unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        assert_eq!(verify_secret("pw1", "pw1"), Err(AuthError::MalformedHash));
    }

    #[test]
    fn test_verification_token() {
        let token = generate_verification_token();

        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_verification_token());
    }
}
