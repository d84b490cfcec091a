//! File storage for the vault's two JSON documents.
//!
//! - `config.json` holds the master password digest and recovery data
//! - `vault.json` holds the credential entries
//!
//! Writes go to a temp file in the same directory which is then renamed
//! over the target, so an interrupted write never leaves a partial file.

use crate::crypto::{MasterHasher, DIGEST_LEN, SALT_LEN};
use crate::error::{Result, VaultError};
use crate::models::{CredentialEntry, VaultConfig};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default data directory name, under the home directory.
pub const DATA_DIR: &str = ".password_vault_pro";

const CONFIG_FILE: &str = "config.json";
const VAULT_FILE: &str = "vault.json";
const TEMP_PREFIX: &str = ".passvault-";

/// Get the default data directory path.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR)
}

/// Handle on one vault directory.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn vault_path(&self) -> PathBuf {
        self.dir.join(VAULT_FILE)
    }

    /// Create the directory (owner-only on Unix) if missing.
    pub fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&self.dir, fs::Permissions::from_mode(0o700))?;
            }

            info!(dir = %self.dir.display(), "created vault directory");
        }
        Ok(())
    }

    /// Check whether a config file is present, without parsing it.
    pub fn config_exists(&self) -> bool {
        self.config_path().exists()
    }

    /// Load the config. A missing file is `Ok(None)`; an unparseable one is
    /// `CorruptConfig`.
    pub fn load_config(&self) -> Result<Option<VaultConfig>> {
        let path = self.config_path();
        let Some(bytes) = read_if_exists(&path)? else {
            debug!(path = %path.display(), "no config file");
            return Ok(None);
        };

        let config: VaultConfig =
            serde_json::from_slice(&bytes).map_err(|e| VaultError::CorruptConfig {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        check_encoded_len("masterPasswordHash", &config.master_password_hash, DIGEST_LEN)
            .and_then(|()| check_encoded_len("salt", &config.salt, SALT_LEN))
            .map_err(|reason| VaultError::CorruptConfig { path: path.clone(), reason })?;

        debug!(path = %path.display(), "loaded config");
        Ok(Some(config))
    }

    /// Atomically write the config.
    pub fn save_config(&self, config: &VaultConfig) -> Result<()> {
        let data = serde_json::to_vec_pretty(config)?;
        self.write_atomic(&self.config_path(), &data)?;
        debug!("saved config");
        Ok(())
    }

    /// Load all entries. A missing file is an empty vault; an unparseable
    /// file, or one breaking entry invariants, is `CorruptVault`.
    pub fn load_vault(&self) -> Result<Vec<CredentialEntry>> {
        let path = self.vault_path();
        let Some(bytes) = read_if_exists(&path)? else {
            debug!(path = %path.display(), "no vault file, starting empty");
            return Ok(Vec::new());
        };

        let entries: Vec<CredentialEntry> =
            serde_json::from_slice(&bytes).map_err(|e| VaultError::CorruptVault {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        check_entries(&entries).map_err(|reason| VaultError::CorruptVault { path, reason })?;

        debug!(count = entries.len(), "loaded vault");
        Ok(entries)
    }

    /// Atomically write all entries, preserving order.
    pub fn save_vault(&self, entries: &[CredentialEntry]) -> Result<()> {
        let data = serde_json::to_vec_pretty(entries)?;
        self.write_atomic(&self.vault_path(), &data)?;
        debug!(count = entries.len(), "saved vault");
        Ok(())
    }

    /// Remove both documents. The directory itself is kept.
    pub fn wipe(&self) -> Result<()> {
        for path in [self.vault_path(), self.config_path()] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        info!(dir = %self.dir.display(), "wiped vault files");
        Ok(())
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.ensure_dir()?;

        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".tmp")
            .tempfile_in(&self.dir)?;
        temp.write_all(contents)?;
        temp.as_file().sync_all()?;

        // Set file permissions to 600 (owner only) on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o600))?;
        }

        temp.persist(path).map_err(|e| VaultError::Io(e.error))?;

        // Make the rename itself durable
        #[cfg(unix)]
        fs::File::open(&self.dir)?.sync_all()?;

        Ok(())
    }
}

/// Check that a base64 field decodes to exactly `expected` bytes.
fn check_encoded_len(field: &str, value: &str, expected: usize) -> std::result::Result<(), String> {
    match MasterHasher::decode(value) {
        Ok(bytes) if bytes.len() == expected => Ok(()),
        Ok(bytes) => Err(format!(
            "{field} is {} bytes, expected {expected}",
            bytes.len()
        )),
        Err(_) => Err(format!("{field} is not valid base64")),
    }
}

fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn check_entries(entries: &[CredentialEntry]) -> std::result::Result<(), String> {
    for (i, entry) in entries.iter().enumerate() {
        if entry.account.trim().is_empty() {
            return Err(format!("entry {i} has an empty account"));
        }
        let key = entry.key();
        if entries[..i].iter().any(|earlier| key.matches(earlier)) {
            return Err(format!("duplicate entry {key}"));
        }
    }
    Ok(())
}
