//! Master password lifecycle and recovery.
//!
//! ```text
//! Uninitialized --setup--> AwaitingLogin --login--> Authenticated
//!                               |   ^                    |
//!                  begin_recovery   reset / cancel       logout
//!                               v   |                    |
//!                         RecoveryInProgress   AwaitingLogin <-+
//! ```

use crate::crypto::MasterHasher;
use crate::error::{Result, VaultError};
use crate::models::{RecoveryInfo, RecoveryPrompt, VaultConfig, CONFIG_VERSION};
use crate::storage::Storage;
use crate::utils::{mask_email, mask_phone};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Minimum master password length, in characters.
pub const MIN_MASTER_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Uninitialized,
    AwaitingLogin,
    RecoveryInProgress,
    Authenticated,
}

impl AuthState {
    fn describe(&self) -> &'static str {
        match self {
            AuthState::Uninitialized => "the vault is not initialized",
            AuthState::AwaitingLogin => "awaiting login",
            AuthState::RecoveryInProgress => "recovery is in progress",
            AuthState::Authenticated => "logged in",
        }
    }
}

/// Owns the vault config and gates access to the credential store.
pub struct AuthManager {
    storage: Storage,
    hasher: MasterHasher,
    config: Option<VaultConfig>,
    state: AuthState,
    recovery_verified: bool,
}

impl AuthManager {
    /// Load the config from storage and pick the starting state.
    pub fn open(storage: Storage) -> Result<Self> {
        let config = storage.load_config()?;
        let state = if config.is_some() {
            AuthState::AwaitingLogin
        } else {
            AuthState::Uninitialized
        };
        debug!(?state, dir = %storage.dir().display(), "opened auth manager");

        Ok(Self {
            storage,
            hasher: MasterHasher::new(),
            config,
            state,
            recovery_verified: false,
        })
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    /// First-run setup.
    pub fn setup_master_password(&mut self, password: &str, recovery: RecoveryInfo) -> Result<()> {
        if self.config.is_some() || self.storage.config_exists() {
            return Err(VaultError::AlreadyInitialized);
        }
        check_length(password)?;

        let email = recovery.email.trim();
        if email.is_empty() {
            return Err(VaultError::MissingRecoveryEmail);
        }

        let (digest, salt) = self.hasher.hash_new(password)?;
        let config = VaultConfig {
            master_password_hash: digest,
            salt,
            recovery_email: email.to_string(),
            recovery_phone: non_empty(recovery.phone),
            recovery_hint: non_empty(recovery.hint),
            created_at: Some(Utc::now()),
            version: CONFIG_VERSION,
        };

        self.storage.save_config(&config)?;
        self.config = Some(config);
        self.state = AuthState::AwaitingLogin;
        info!("master password set up");
        Ok(())
    }

    /// Check the master password. Repeated failures are not throttled.
    pub fn login(&mut self, password: &str) -> Result<()> {
        match self.state {
            AuthState::AwaitingLogin | AuthState::RecoveryInProgress => {}
            other => return Err(VaultError::InvalidState(other.describe())),
        }
        let config = self.config.as_ref().ok_or(VaultError::NotInitialized)?;

        if !self
            .hasher
            .verify(password, &config.master_password_hash, &config.salt)?
        {
            warn!("login failed");
            return Err(VaultError::InvalidCredentials);
        }

        self.recovery_verified = false;
        self.state = AuthState::Authenticated;
        info!("login succeeded");
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        if self.state != AuthState::Authenticated {
            return Err(VaultError::InvalidState(self.state.describe()));
        }
        self.state = AuthState::AwaitingLogin;
        info!("logged out");
        Ok(())
    }

    /// Start a recovery and return what can be shown to the user:
    /// the hint plus masked email and phone.
    pub fn begin_recovery(&mut self) -> Result<RecoveryPrompt> {
        match self.state {
            AuthState::AwaitingLogin | AuthState::RecoveryInProgress => {}
            other => return Err(VaultError::InvalidState(other.describe())),
        }
        let config = self.config.as_ref().ok_or(VaultError::NotInitialized)?;
        if config.recovery_email.trim().is_empty() {
            return Err(VaultError::RecoveryUnavailable);
        }

        let prompt = RecoveryPrompt {
            hint: config.recovery_hint.clone(),
            masked_email: mask_email(&config.recovery_email),
            masked_phone: config.recovery_phone.as_deref().map(mask_phone),
        };

        self.recovery_verified = false;
        self.state = AuthState::RecoveryInProgress;
        debug!("recovery started");
        Ok(prompt)
    }

    /// Check recovery answers. The email is compared ignoring case, the
    /// hint exactly. An unregistered hint matches an empty answer.
    pub fn verify_recovery(&mut self, email: &str, hint: &str) -> Result<()> {
        if self.state == AuthState::AwaitingLogin {
            self.begin_recovery()?;
        }
        if self.state != AuthState::RecoveryInProgress {
            return Err(VaultError::InvalidState(self.state.describe()));
        }
        let config = self.config.as_ref().ok_or(VaultError::NotInitialized)?;

        let email_ok = email
            .trim()
            .eq_ignore_ascii_case(config.recovery_email.trim());
        let hint_ok = hint == config.recovery_hint.as_deref().unwrap_or("");

        if !(email_ok && hint_ok) {
            self.recovery_verified = false;
            warn!("recovery verification failed");
            return Err(VaultError::RecoveryMismatch);
        }

        self.recovery_verified = true;
        info!("recovery verified");
        Ok(())
    }

    /// Replace the master password after a successful `verify_recovery`.
    /// Recovery data and stored entries are kept.
    pub fn reset_master_password(&mut self, new_password: &str) -> Result<()> {
        if self.state != AuthState::RecoveryInProgress || !self.recovery_verified {
            return Err(VaultError::RecoveryNotVerified);
        }
        check_length(new_password)?;

        let mut config = self.config.clone().ok_or(VaultError::NotInitialized)?;
        let (digest, salt) = self.hasher.hash_new(new_password)?;
        config.master_password_hash = digest;
        config.salt = salt;

        self.storage.save_config(&config)?;
        self.config = Some(config);
        self.recovery_verified = false;
        self.state = AuthState::AwaitingLogin;
        info!("master password reset through recovery");
        Ok(())
    }

    /// Abandon a recovery in progress.
    pub fn cancel_recovery(&mut self) {
        if self.state == AuthState::RecoveryInProgress {
            self.state = AuthState::AwaitingLogin;
        }
        self.recovery_verified = false;
    }

    /// Drop the config from memory after the caller wiped storage.
    pub(crate) fn forget(&mut self) {
        self.config = None;
        self.recovery_verified = false;
        self.state = AuthState::Uninitialized;
    }
}

fn check_length(password: &str) -> Result<()> {
    if password.chars().count() < MIN_MASTER_PASSWORD_LENGTH {
        return Err(VaultError::PasswordTooShort {
            minimum: MIN_MASTER_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn recovery() -> RecoveryInfo {
        RecoveryInfo::new("a@b.com").with_hint("pet")
    }

    fn initialized(temp_dir: &TempDir) -> AuthManager {
        let mut auth = AuthManager::open(Storage::new(temp_dir.path())).unwrap();
        auth.setup_master_password("Secret123!", recovery()).unwrap();
        auth
    }

    #[test]
    fn test_fresh_directory_is_uninitialized() {
        let temp_dir = TempDir::new().unwrap();
        let mut auth = AuthManager::open(Storage::new(temp_dir.path())).unwrap();

        assert_eq!(auth.state(), AuthState::Uninitialized);
        assert!(matches!(auth.login("anything"), Err(VaultError::InvalidState(_))));
    }

    #[test]
    fn test_setup_then_login() {
        let temp_dir = TempDir::new().unwrap();
        let mut auth = initialized(&temp_dir);

        assert_eq!(auth.state(), AuthState::AwaitingLogin);
        assert!(matches!(auth.login("wrong"), Err(VaultError::InvalidCredentials)));
        assert_eq!(auth.state(), AuthState::AwaitingLogin);
        auth.login("Secret123!").unwrap();
        assert!(auth.is_authenticated());
    }

    #[test]
    fn test_setup_twice_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut auth = initialized(&temp_dir);
        assert!(matches!(
            auth.setup_master_password("Another1!", recovery()),
            Err(VaultError::AlreadyInitialized)
        ));

        // A second manager over the same directory sees the config too
        let mut other = AuthManager::open(Storage::new(temp_dir.path())).unwrap();
        assert!(matches!(
            other.setup_master_password("Another1!", recovery()),
            Err(VaultError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_setup_validation() {
        let temp_dir = TempDir::new().unwrap();
        let mut auth = AuthManager::open(Storage::new(temp_dir.path())).unwrap();

        assert!(matches!(
            auth.setup_master_password("12345", recovery()),
            Err(VaultError::PasswordTooShort { minimum: 6 })
        ));
        assert!(matches!(
            auth.setup_master_password("123456", RecoveryInfo::new("  ")),
            Err(VaultError::MissingRecoveryEmail)
        ));
        assert_eq!(auth.state(), AuthState::Uninitialized);
        assert!(!Storage::new(temp_dir.path()).config_exists());
    }

    #[test]
    fn test_config_never_holds_plaintext() {
        let temp_dir = TempDir::new().unwrap();
        initialized(&temp_dir);

        let raw = std::fs::read_to_string(temp_dir.path().join("config.json")).unwrap();
        assert!(!raw.contains("Secret123!"));
        assert!(raw.contains("masterPasswordHash"));
    }

    #[test]
    fn test_login_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        initialized(&temp_dir);

        let mut auth = AuthManager::open(Storage::new(temp_dir.path())).unwrap();
        assert_eq!(auth.state(), AuthState::AwaitingLogin);
        auth.login("Secret123!").unwrap();
    }

    #[test]
    fn test_logout() {
        let temp_dir = TempDir::new().unwrap();
        let mut auth = initialized(&temp_dir);

        assert!(auth.logout().is_err());
        auth.login("Secret123!").unwrap();
        auth.logout().unwrap();
        assert_eq!(auth.state(), AuthState::AwaitingLogin);
    }

    #[test]
    fn test_recovery_prompt_is_masked() {
        let temp_dir = TempDir::new().unwrap();
        let mut auth = AuthManager::open(Storage::new(temp_dir.path())).unwrap();
        auth.setup_master_password(
            "Secret123!",
            RecoveryInfo::new("tharun@gmail.com")
                .with_phone("5551234567")
                .with_hint("pet"),
        )
        .unwrap();

        let prompt = auth.begin_recovery().unwrap();
        assert_eq!(prompt.masked_email, "th***@gmail.com");
        assert_eq!(prompt.masked_phone.as_deref(), Some("***4567"));
        assert_eq!(prompt.hint.as_deref(), Some("pet"));
        assert_eq!(auth.state(), AuthState::RecoveryInProgress);
    }

    #[test]
    fn test_reset_requires_verified_recovery() {
        let temp_dir = TempDir::new().unwrap();
        let mut auth = initialized(&temp_dir);

        assert!(matches!(
            auth.reset_master_password("NewPass1!"),
            Err(VaultError::RecoveryNotVerified)
        ));
        auth.begin_recovery().unwrap();
        assert!(matches!(
            auth.reset_master_password("NewPass1!"),
            Err(VaultError::RecoveryNotVerified)
        ));
        assert!(matches!(
            auth.verify_recovery("a@b.com", "PET"),
            Err(VaultError::RecoveryMismatch)
        ));
        assert!(matches!(
            auth.reset_master_password("NewPass1!"),
            Err(VaultError::RecoveryNotVerified)
        ));
    }

    #[test]
    fn test_recovery_email_ignores_case() {
        let temp_dir = TempDir::new().unwrap();
        let mut auth = initialized(&temp_dir);

        auth.verify_recovery(" A@B.COM ", "pet").unwrap();
        auth.reset_master_password("NewPass1!").unwrap();
        auth.login("NewPass1!").unwrap();
    }

    #[test]
    fn test_failed_verification_clears_earlier_success() {
        let temp_dir = TempDir::new().unwrap();
        let mut auth = initialized(&temp_dir);

        auth.verify_recovery("a@b.com", "pet").unwrap();
        assert!(auth.verify_recovery("a@b.com", "dog").is_err());
        assert!(matches!(
            auth.reset_master_password("NewPass1!"),
            Err(VaultError::RecoveryNotVerified)
        ));
    }

    #[test]
    fn test_missing_hint_matches_empty_answer() {
        let temp_dir = TempDir::new().unwrap();
        let mut auth = AuthManager::open(Storage::new(temp_dir.path())).unwrap();
        auth.setup_master_password("Secret123!", RecoveryInfo::new("a@b.com"))
            .unwrap();

        assert!(auth.verify_recovery("a@b.com", "pet").is_err());
        auth.verify_recovery("a@b.com", "").unwrap();
    }

    #[test]
    fn test_cancel_recovery() {
        let temp_dir = TempDir::new().unwrap();
        let mut auth = initialized(&temp_dir);

        auth.verify_recovery("a@b.com", "pet").unwrap();
        auth.cancel_recovery();
        assert_eq!(auth.state(), AuthState::AwaitingLogin);
        assert!(matches!(
            auth.reset_master_password("NewPass1!"),
            Err(VaultError::RecoveryNotVerified)
        ));
    }

    #[test]
    fn test_recovery_not_allowed_while_logged_in() {
        let temp_dir = TempDir::new().unwrap();
        let mut auth = initialized(&temp_dir);
        auth.login("Secret123!").unwrap();

        assert!(matches!(auth.begin_recovery(), Err(VaultError::InvalidState(_))));
        assert!(matches!(
            auth.verify_recovery("a@b.com", "pet"),
            Err(VaultError::InvalidState(_))
        ));
    }
}
