//! One-way hashing of the master password using salted Argon2id.

use argon2::{Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Errors that can occur during cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid base64 encoding")]
    InvalidBase64,
    #[error("Invalid salt length")]
    InvalidSaltLength,
    #[error("Password hashing failed")]
    HashingFailed,
}

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Digest length in bytes.
pub const DIGEST_LEN: usize = 32;

/// Hashes and verifies master passwords.
pub struct MasterHasher {
    // Argon2id parameters (OWASP minimum for interactive logins)
    argon2_time_cost: u32,
    argon2_memory_cost: u32,
    argon2_parallelism: u32,
    argon2_hash_len: usize,
    argon2_salt_len: usize,
}

impl Default for MasterHasher {
    fn default() -> Self {
        Self {
            argon2_time_cost: 2,
            argon2_memory_cost: 19456, // 19 MiB
            argon2_parallelism: 1,
            argon2_hash_len: DIGEST_LEN,
            argon2_salt_len: SALT_LEN,
        }
    }
}

impl MasterHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a new random salt.
    pub fn generate_salt(&self) -> Vec<u8> {
        let mut salt = vec![0u8; self.argon2_salt_len];
        OsRng.fill_bytes(&mut salt);
        salt
    }

    /// Encode bytes as base64 for the config file.
    pub fn encode(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    /// Decode base64 from the config file.
    pub fn decode(value: &str) -> Result<Vec<u8>, CryptoError> {
        STANDARD.decode(value).map_err(|_| CryptoError::InvalidBase64)
    }

    /// Compute the fixed-length digest of a password.
    pub fn hash(&self, password: &str, salt: &[u8]) -> Result<PasswordDigest, CryptoError> {
        if salt.len() != self.argon2_salt_len {
            return Err(CryptoError::InvalidSaltLength);
        }

        let params = Params::new(
            self.argon2_memory_cost,
            self.argon2_time_cost,
            self.argon2_parallelism,
            Some(self.argon2_hash_len),
        )
        .map_err(|_| CryptoError::HashingFailed)?;

        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

        let mut output = vec![0u8; self.argon2_hash_len];
        argon2
            .hash_password_into(password.as_bytes(), salt, &mut output)
            .map_err(|_| CryptoError::HashingFailed)?;

        Ok(PasswordDigest(output))
    }

    /// Hash a password under a fresh salt.
    /// Returns (base64 digest, base64 salt).
    pub fn hash_new(&self, password: &str) -> Result<(String, String), CryptoError> {
        let salt = self.generate_salt();
        let digest = self.hash(password, &salt)?;
        Ok((digest.to_base64(), Self::encode(&salt)))
    }

    /// Check a password against a stored base64 digest and salt.
    pub fn verify(
        &self,
        password: &str,
        stored_digest: &str,
        stored_salt: &str,
    ) -> Result<bool, CryptoError> {
        let salt = Self::decode(stored_salt)?;
        let expected = Self::decode(stored_digest)?;
        let actual = self.hash(password, &salt)?;
        Ok(actual.as_bytes() == expected.as_slice())
    }
}

/// A password digest that is zeroed on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PasswordDigest(Vec<u8>);

impl PasswordDigest {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        MasterHasher::encode(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salt_generation() {
        let hasher = MasterHasher::new();
        let salt1 = hasher.generate_salt();
        let salt2 = hasher.generate_salt();

        assert_eq!(salt1.len(), 16);
        assert_ne!(salt1, salt2);
    }

    #[test]
    fn test_hash_consistency_and_length() {
        let hasher = MasterHasher::new();
        let salt = hasher.generate_salt();

        let first = hasher.hash("test_password_123", &salt).unwrap();
        let second = hasher.hash("test_password_123", &salt).unwrap();

        assert_eq!(first.as_bytes(), second.as_bytes());
        assert_eq!(first.as_bytes().len(), 32);
    }

    #[test]
    fn test_different_passwords_differ() {
        let hasher = MasterHasher::new();
        let salt = hasher.generate_salt();

        let a = hasher.hash("password1", &salt).unwrap();
        let b = hasher.hash("password2", &salt).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_same_password_different_salts_differ() {
        let hasher = MasterHasher::new();
        let (digest1, salt1) = hasher.hash_new("same").unwrap();
        let (digest2, salt2) = hasher.hash_new("same").unwrap();

        assert_ne!(salt1, salt2);
        assert_ne!(digest1, digest2);
    }

    #[test]
    fn test_verify() {
        let hasher = MasterHasher::new();
        let (digest, salt) = hasher.hash_new("Secret123!").unwrap();

        assert!(hasher.verify("Secret123!", &digest, &salt).unwrap());
        assert!(!hasher.verify("secret123!", &digest, &salt).unwrap());
        assert!(!hasher.verify("", &digest, &salt).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_salt() {
        let hasher = MasterHasher::new();
        let (digest, _) = hasher.hash_new("Secret123!").unwrap();

        assert!(matches!(
            hasher.verify("Secret123!", &digest, "not base64!!"),
            Err(CryptoError::InvalidBase64)
        ));
        assert!(matches!(
            hasher.verify("Secret123!", &digest, &MasterHasher::encode(&[1, 2, 3])),
            Err(CryptoError::InvalidSaltLength)
        ));
    }
}
