//! Cryptographic helper for authentication-sensitive hashing.
//!
//! Two primitives live here so parameter choices stay consistent:
//! - Argon2id for password hashing (salted PHC strings).
//! - Random opaque session tokens, persisted only as SHA-256 digests so a
//!   leaked store never yields usable bearer tokens.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

const SESSION_TOKEN_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("password hashing error: {0}")]
    PasswordHash(String),
}

/// Password hashing and session token minting.
#[derive(Debug, Default)]
pub struct PasswordCrypto {
    argon2: Argon2<'static>,
}

impl PasswordCrypto {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a password using Argon2id with a fresh random salt. Output is a
    /// PHC string suitable for storage; two hashes of the same input differ.
    pub fn hash_password(&self, password: &str) -> Result<String, CryptoError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CryptoError::PasswordHash(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    /// Verify a password against a stored digest. Returns false on mismatch
    /// and on a malformed digest; never errors outward.
    pub fn verify_password(&self, password: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Generate an opaque session token and the digest it is stored under.
    ///
    /// The token itself leaves the server exactly once, in the issuing
    /// response; only the digest ever reaches a session store.
    pub fn mint_session_token(&self) -> (String, String) {
        let mut bytes = [0u8; SESSION_TOKEN_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);
        let token_hash = Self::hash_session_token(&token);
        (token, token_hash)
    }

    /// Digest a client-held token for session store lookup.
    pub fn hash_session_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
