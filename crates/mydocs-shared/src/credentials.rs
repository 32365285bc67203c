//! Credential hashing for the single local user record.
//!
//! New records store an argon2id PHC string. Records written by older
//! versions hold the password in clear text; those still verify so existing
//! users can log in, and they are rehashed the next time the record is saved.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use subtle::ConstantTimeEq;

use crate::error::CredentialError;

pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hashing(e.to_string()))
}

pub fn is_password_hash(stored: &str) -> bool {
    PasswordHash::new(stored).is_ok()
}

pub fn verify_password(candidate: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok(),
        // legacy plaintext record
        Err(_) => candidate.as_bytes().ct_eq(stored.as_bytes()).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secreto").unwrap();
        assert!(is_password_hash(&hash));
        assert!(!hash.contains("secreto"));
        assert!(verify_password("secreto", &hash));
        assert!(!verify_password("Secreto", &hash));
    }

    #[test]
    fn test_salted() {
        let a = hash_password("secreto").unwrap();
        let b = hash_password("secreto").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_legacy_plaintext() {
        assert!(!is_password_hash("secreto"));
        assert!(verify_password("secreto", "secreto"));
        assert!(!verify_password("secreta", "secreto"));
        assert!(!verify_password("secreto1", "secreto"));
    }
}
