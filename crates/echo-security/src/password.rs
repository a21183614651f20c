//! Password hashing with Argon2, legacy bcrypt verification and strength checks

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use echo_shared::constants::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use thiserror::Error;
use zxcvbn::{zxcvbn, Score};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Hash error: {0}")]
    HashError(String),
    #[error("Password must be at least {} characters", MIN_PASSWORD_LENGTH)]
    TooShort,
    #[error("Password must be at most {} characters", MAX_PASSWORD_LENGTH)]
    TooLong,
    #[error("Password is too weak")]
    TooWeak,
}

pub struct PasswordService;

impl PasswordService {
    pub fn hash(password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::HashError(e.to_string()))
    }

    /// Accepts Argon2 PHC strings and bcrypt hashes carried over from the
    /// legacy user table.
    pub fn verify(password: &str, hash: &str) -> Result<bool, PasswordError> {
        if Self::is_bcrypt(hash) {
            return bcrypt::verify(password, hash).map_err(|e| PasswordError::HashError(e.to_string()));
        }

        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub fn needs_rehash(hash: &str) -> bool {
        Self::is_bcrypt(hash)
    }

    /// Length bounds plus a zxcvbn score of at least 2. `user_inputs` are
    /// penalised when they appear in the password (email, name, ...).
    pub fn check_strength(password: &str, user_inputs: &[&str]) -> Result<(), PasswordError> {
        let len = password.chars().count();
        if len < MIN_PASSWORD_LENGTH {
            return Err(PasswordError::TooShort);
        }
        if len > MAX_PASSWORD_LENGTH {
            return Err(PasswordError::TooLong);
        }
        if zxcvbn(password, user_inputs).score() < Score::Two {
            return Err(PasswordError::TooWeak);
        }
        Ok(())
    }

    fn is_bcrypt(hash: &str) -> bool {
        hash.starts_with("$2a$") || hash.starts_with("$2b$") || hash.starts_with("$2y$")
    }
}
