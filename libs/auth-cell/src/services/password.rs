use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::models::AuthError;

pub struct PasswordService;

impl PasswordService {
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hash(e.to_string()))?;
        let argon2 = Argon2::default();

        match argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Hash(e.to_string())),
        }
    }

    /// Minimum bar for stored credentials: at least six characters with
    /// one uppercase letter, one lowercase letter and one digit.
    pub fn validate_strength(password: &str) -> Result<(), AuthError> {
        if password.chars().count() < 6 {
            return Err(AuthError::WeakPassword(
                "must be at least 6 characters long".to_string(),
            ));
        }
        if !password.chars().any(|c| c.is_uppercase()) {
            return Err(AuthError::WeakPassword(
                "must contain an uppercase letter".to_string(),
            ));
        }
        if !password.chars().any(|c| c.is_lowercase()) {
            return Err(AuthError::WeakPassword(
                "must contain a lowercase letter".to_string(),
            ));
        }
        if !password.chars().any(|c| c.is_numeric()) {
            return Err(AuthError::WeakPassword(
                "must contain a digit".to_string(),
            ));
        }
        Ok(())
    }
}
