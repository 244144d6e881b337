//! Password hashing with Argon2 and the password strength policy.

use crate::auth::IdentityError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("hash error: {0}")]
    HashError(String),
}

pub struct PasswordService;

impl PasswordService {
    pub fn hash(password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::HashError(e.to_string()))
    }

    pub fn verify(password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::HashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

/// Strength rules applied when a user is created.
#[derive(Clone, Debug)]
pub struct PasswordPolicy {
    pub required_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        PasswordPolicy {
            required_length: 6,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        }
    }
}

impl PasswordPolicy {
    /// Every rule the password breaks; empty when it is acceptable.
    pub fn check(&self, password: &str) -> Vec<IdentityError> {
        let mut errors = Vec::new();
        if password.chars().count() < self.required_length {
            errors.push(IdentityError::new(
                "PasswordTooShort",
                format!("Passwords must be at least {} characters.", self.required_length),
            ));
        }
        if self.require_non_alphanumeric && password.chars().all(|c| c.is_ascii_alphanumeric()) {
            errors.push(IdentityError::new(
                "PasswordRequiresNonAlphanumeric",
                "Passwords must have at least one non alphanumeric character.",
            ));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(IdentityError::new(
                "PasswordRequiresDigit",
                "Passwords must have at least one digit ('0'-'9').",
            ));
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push(IdentityError::new(
                "PasswordRequiresLower",
                "Passwords must have at least one lowercase ('a'-'z').",
            ));
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push(IdentityError::new(
                "PasswordRequiresUpper",
                "Passwords must have at least one uppercase ('A'-'Z').",
            ));
        }
        errors
    }
}
