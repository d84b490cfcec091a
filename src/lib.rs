//! passvault: a local, offline credential manager guarded by one master password.

pub mod auth;
pub mod catalog;
pub mod cli;
pub mod crypto;
pub mod error;
pub mod generator;
pub mod models;
pub mod security;
pub mod storage;
pub mod store;
pub mod strength;
pub mod utils;
pub mod vault;

// Re-export commonly used types
pub use auth::AuthState;
pub use error::{Result, VaultError};
pub use models::{Category, CredentialEntry, EntryKey, EntryUpdate, RecoveryInfo};
pub use store::CredentialStore;
pub use strength::Strength;
pub use vault::PasswordVault;
