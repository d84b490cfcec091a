//! Error types for passvault.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for vault operations.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Vault is already initialized")]
    AlreadyInitialized,

    #[error("Vault is not initialized - run setup first")]
    NotInitialized,

    #[error("Invalid master password")]
    InvalidCredentials,

    #[error("Vault is locked - log in with the master password first")]
    Locked,

    #[error("Operation not allowed while {0}")]
    InvalidState(&'static str),

    #[error("Recovery details do not match")]
    RecoveryMismatch,

    #[error("Recovery has not been verified")]
    RecoveryNotVerified,

    #[error("No recovery details are registered for this vault")]
    RecoveryUnavailable,

    #[error("Master password must be at least {minimum} characters")]
    PasswordTooShort { minimum: usize },

    #[error("A recovery email is required")]
    MissingRecoveryEmail,

    #[error("Entry already exists: {0}")]
    DuplicateEntry(String),

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    #[error("Generated password length must be at least {minimum}")]
    InvalidLength { minimum: usize },

    #[error("Config file {} is corrupt: {reason}", path.display())]
    CorruptConfig { path: PathBuf, reason: String },

    #[error("Vault file {} is corrupt: {reason}", path.display())]
    CorruptVault { path: PathBuf, reason: String },

    #[error("Clipboard operation failed")]
    ClipboardFailed,

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Crypto error: {0}")]
    Crypto(#[from] crate::crypto::CryptoError),

    #[error("{0}")]
    Other(String),
}

impl VaultError {
    /// Integrity and storage failures that need manual intervention.
    /// Everything else can be handled by re-prompting the user.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            VaultError::CorruptConfig { .. }
                | VaultError::CorruptVault { .. }
                | VaultError::Io(_)
                | VaultError::Serialization(_)
                | VaultError::Crypto(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;
