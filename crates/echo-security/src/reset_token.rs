//! Single-use password reset tokens
//!
//! The plaintext goes to the user, only the SHA-256 digest is stored.

use rand::RngCore;
use sha2::{Digest, Sha256};

pub struct ResetToken {
    pub plaintext: String,
    pub hash: String,
}

impl ResetToken {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        let plaintext = hex::encode(bytes);
        let hash = Self::digest(&plaintext);
        Self { plaintext, hash }
    }

    pub fn digest(plaintext: &str) -> String {
        hex::encode(Sha256::digest(plaintext.trim().as_bytes()))
    }
}
