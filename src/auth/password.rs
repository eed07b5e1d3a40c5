//! Password hashing and verification.
//!
//! New hashes are bcrypt at a fixed cost. Stored argon2 PHC strings are
//! verified as well.

use crate::error::{AppError, AppResult};
use argon2::{
    password_hash::{PasswordHash, PasswordVerifier},
    Argon2,
};

/// Bcrypt cost factor for new hashes.
pub const BCRYPT_COST: u32 = 10;

const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, BCRYPT_COST).map_err(|e| AppError::Hash(format!("hash: {}", e)))
}

/// Compare `password` against a stored hash.
///
/// `Ok(false)` means a mismatch; an unreadable hash is an error, not a mismatch.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    if is_bcrypt(hash) {
        return bcrypt::verify(password, hash)
            .map_err(|e| AppError::Hash(format!("bcrypt: {}", e)));
    }

    let parsed =
        PasswordHash::new(hash).map_err(|e| AppError::Hash(format!("parse hash: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Hash(format!("verify: {}", e))),
    }
}

fn is_bcrypt(hash: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|p| hash.starts_with(p))
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: &str) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Hash(format!("task join: {}", e)))?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(password: &str, hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Hash(format!("task join: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_password() {
        let hash = hash_password("mypassword").unwrap();
        assert_ne!(hash, "mypassword");
        assert!(hash.starts_with("$2b$10$"));
        assert!(verify_password("mypassword", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verifies_bcrypt_hashes() {
        let hash = bcrypt::hash("pw1", 4).unwrap();
        assert!(hash.starts_with("$2b$"));
        assert!(verify_password("pw1", &hash).unwrap());
        assert!(!verify_password("pw2", &hash).unwrap());
    }

    #[test]
    fn verifies_argon2_hashes() {
        use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"pw1", &salt)
            .unwrap()
            .to_string();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("pw1", &hash).unwrap());
        assert!(!verify_password("pw2", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error_not_a_mismatch() {
        let err = verify_password("pw", "not-a-hash").unwrap_err();
        assert!(matches!(err, AppError::Hash(_)));

        let err = verify_password("pw", "$2b$10$short").unwrap_err();
        assert!(matches!(err, AppError::Hash(_)));
    }

    #[tokio::test]
    async fn blocking_wrappers_agree() {
        let hash = hash_password_blocking("pw").await.unwrap();
        assert!(verify_password_blocking("pw", &hash).await.unwrap());
        assert!(!verify_password_blocking("nope", &hash).await.unwrap());
    }
}
