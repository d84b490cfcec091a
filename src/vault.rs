//! The vault as a front end sees it: authentication in front of the
//! credential store, both backed by one data directory.

use crate::auth::{AuthManager, AuthState};
use crate::error::{Result, VaultError};
use crate::models::{RecoveryInfo, RecoveryPrompt};
use crate::storage::Storage;
use crate::store::CredentialStore;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One vault directory with its auth state and, once logged in, its entries.
pub struct PasswordVault {
    storage: Storage,
    auth: AuthManager,
    store: Option<CredentialStore>,
}

impl PasswordVault {
    /// Open the vault in `dir`. Nothing is created on disk until setup.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let storage = Storage::new(dir);
        let auth = AuthManager::open(storage.clone())?;
        Ok(Self {
            storage,
            auth,
            store: None,
        })
    }

    pub fn dir(&self) -> &Path {
        self.storage.dir()
    }

    pub fn state(&self) -> AuthState {
        self.auth.state()
    }

    pub fn is_initialized(&self) -> bool {
        self.auth.state() != AuthState::Uninitialized
    }

    pub fn setup_master_password(&mut self, password: &str, recovery: RecoveryInfo) -> Result<()> {
        self.auth.setup_master_password(password, recovery)
    }

    /// Log in and load the entries. A corrupt vault file fails the login
    /// and leaves the vault locked.
    pub fn login(&mut self, password: &str) -> Result<()> {
        self.auth.login(password)?;
        if self.store.is_none() {
            match CredentialStore::open(self.storage.clone()) {
                Ok(store) => self.store = Some(store),
                Err(e) => {
                    warn!(error = %e, "could not load vault after login");
                    self.auth.logout()?;
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Lock the vault. Loaded entries stay in memory but are unreachable
    /// until the next login.
    pub fn logout(&mut self) -> Result<()> {
        self.auth.logout()
    }

    pub fn begin_recovery(&mut self) -> Result<RecoveryPrompt> {
        self.auth.begin_recovery()
    }

    pub fn verify_recovery(&mut self, email: &str, hint: &str) -> Result<()> {
        self.auth.verify_recovery(email, hint)
    }

    pub fn reset_master_password(&mut self, new_password: &str) -> Result<()> {
        self.auth.reset_master_password(new_password)
    }

    pub fn cancel_recovery(&mut self) {
        self.auth.cancel_recovery()
    }

    /// Read access to the entries; requires a login.
    pub fn store(&self) -> Result<&CredentialStore> {
        if !self.auth.is_authenticated() {
            return Err(VaultError::Locked);
        }
        self.store.as_ref().ok_or(VaultError::Locked)
    }

    /// Write access to the entries; requires a login.
    pub fn store_mut(&mut self) -> Result<&mut CredentialStore> {
        if !self.auth.is_authenticated() {
            return Err(VaultError::Locked);
        }
        self.store.as_mut().ok_or(VaultError::Locked)
    }

    /// Delete the config and every entry, returning to the uninitialized
    /// state. Requires a login.
    pub fn reset(&mut self) -> Result<()> {
        if !self.auth.is_authenticated() {
            return Err(VaultError::Locked);
        }
        self.storage.wipe()?;
        self.store = None;
        self.auth.forget();
        info!(dir = %self.storage.dir().display(), "vault reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn logged_in(temp_dir: &TempDir) -> PasswordVault {
        let mut vault = PasswordVault::open(temp_dir.path()).unwrap();
        vault
            .setup_master_password("Secret123!", RecoveryInfo::new("a@b.com"))
            .unwrap();
        vault.login("Secret123!").unwrap();
        vault
    }

    #[test]
    fn test_store_requires_login() {
        let temp_dir = TempDir::new().unwrap();
        let mut vault = PasswordVault::open(temp_dir.path()).unwrap();
        assert!(!vault.is_initialized());
        assert!(matches!(vault.store(), Err(VaultError::Locked)));

        vault
            .setup_master_password("Secret123!", RecoveryInfo::new("a@b.com"))
            .unwrap();
        assert!(matches!(vault.store_mut(), Err(VaultError::Locked)));

        vault.login("Secret123!").unwrap();
        assert!(vault.store().unwrap().is_empty());
    }

    #[test]
    fn test_logout_locks_store() {
        let temp_dir = TempDir::new().unwrap();
        let mut vault = logged_in(&temp_dir);
        vault
            .store_mut()
            .unwrap()
            .add_entry("GitHub", "me", "p", None)
            .unwrap();

        vault.logout().unwrap();
        assert!(matches!(vault.store(), Err(VaultError::Locked)));

        vault.login("Secret123!").unwrap();
        assert_eq!(vault.store().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_vault_fails_login() {
        let temp_dir = TempDir::new().unwrap();
        logged_in(&temp_dir);
        std::fs::write(temp_dir.path().join("vault.json"), "garbage").unwrap();

        let mut vault = PasswordVault::open(temp_dir.path()).unwrap();
        let err = vault.login("Secret123!").unwrap_err();
        assert!(matches!(err, VaultError::CorruptVault { .. }));
        assert!(err.is_fatal());
        assert_eq!(vault.state(), AuthState::AwaitingLogin);
        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("vault.json")).unwrap(),
            "garbage"
        );
    }

    #[test]
    fn test_reset_wipes_everything() {
        let temp_dir = TempDir::new().unwrap();
        let mut vault = logged_in(&temp_dir);
        vault
            .store_mut()
            .unwrap()
            .add_entry("GitHub", "me", "p", None)
            .unwrap();

        vault.reset().unwrap();
        assert_eq!(vault.state(), AuthState::Uninitialized);
        assert!(!temp_dir.path().join("config.json").exists());
        assert!(!temp_dir.path().join("vault.json").exists());

        vault
            .setup_master_password("Another1!", RecoveryInfo::new("c@d.com"))
            .unwrap();
        vault.login("Another1!").unwrap();
        assert!(vault.store().unwrap().is_empty());
    }

    #[test]
    fn test_reset_requires_login() {
        let temp_dir = TempDir::new().unwrap();
        let mut vault = logged_in(&temp_dir);
        vault.logout().unwrap();
        assert!(matches!(vault.reset(), Err(VaultError::Locked)));
    }
}
