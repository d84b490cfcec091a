//! Data models for the credential vault.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of categories an entry can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Social Media")]
    SocialMedia,
    Streaming,
    Email,
    Development,
    #[serde(rename = "Cloud Storage")]
    CloudStorage,
    Finance,
    Shopping,
    Work,
    Other,
}

impl Category {
    /// Every category, fallback last.
    pub const ALL: [Category; 9] = [
        Category::SocialMedia,
        Category::Streaming,
        Category::Email,
        Category::Development,
        Category::CloudStorage,
        Category::Finance,
        Category::Shopping,
        Category::Work,
        Category::Other,
    ];

    /// Human readable name, also used on disk.
    pub fn name(&self) -> &'static str {
        match self {
            Category::SocialMedia => "Social Media",
            Category::Streaming => "Streaming",
            Category::Email => "Email",
            Category::Development => "Development",
            Category::CloudStorage => "Cloud Storage",
            Category::Finance => "Finance",
            Category::Shopping => "Shopping",
            Category::Work => "Work",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts "Cloud Storage", "cloud-storage", "cloudstorage" and so on.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_category(s);
        Category::ALL
            .iter()
            .copied()
            .find(|c| normalize_category(c.name()) == wanted)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

fn normalize_category(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// A single stored credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialEntry {
    /// Service or site name
    pub account: String,
    /// Username or email used at the service
    pub login_identifier: String,
    /// Stored in plaintext
    pub secret: String,
    pub category: Category,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CredentialEntry {
    /// Key identifying this entry.
    pub fn key(&self) -> EntryKey {
        EntryKey::new(&self.account, &self.login_identifier)
    }
}

/// Identity of an entry: the (account, login identifier) pair.
///
/// Comparison trims surrounding whitespace and ignores case, so
/// `GitHub`/`Me@x.com` and `github`/`me@x.com` name the same entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryKey {
    pub account: String,
    pub login_identifier: String,
}

impl EntryKey {
    pub fn new(account: impl Into<String>, login_identifier: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            login_identifier: login_identifier.into(),
        }
    }

    /// Check whether this key names the given entry.
    pub fn matches(&self, entry: &CredentialEntry) -> bool {
        same_identity(&self.account, &entry.account)
            && same_identity(&self.login_identifier, &entry.login_identifier)
    }

    /// Check whether the entry belongs to this key's account, whatever its login.
    pub fn matches_account(&self, entry: &CredentialEntry) -> bool {
        same_identity(&self.account, &entry.account)
    }

    /// Check whether two keys name the same entry.
    pub fn same_as(&self, other: &EntryKey) -> bool {
        same_identity(&self.account, &other.account)
            && same_identity(&self.login_identifier, &other.login_identifier)
    }
}

fn same_identity(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.account, self.login_identifier)
    }
}

impl FromStr for EntryKey {
    type Err = String;

    /// Parse `ACCOUNT:LOGIN`, splitting on the first colon.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (account, login) = s
            .split_once(':')
            .ok_or_else(|| format!("expected ACCOUNT:LOGIN, got '{s}'"))?;
        if account.trim().is_empty() {
            return Err(format!("missing account in '{s}'"));
        }
        Ok(EntryKey::new(account.trim(), login.trim()))
    }
}

/// Field changes for an existing entry. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub account: Option<String>,
    pub login_identifier: Option<String>,
    pub secret: Option<String>,
    pub category: Option<Category>,
}

impl EntryUpdate {
    pub fn is_empty(&self) -> bool {
        self.account.is_none()
            && self.login_identifier.is_none()
            && self.secret.is_none()
            && self.category.is_none()
    }
}

/// Persisted master-password and recovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VaultConfig {
    /// Base64 Argon2id digest of the master password
    pub master_password_hash: String,
    /// Base64 per-installation salt
    pub salt: String,
    pub recovery_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default = "default_config_version")]
    pub version: u32,
}

pub const CONFIG_VERSION: u32 = 1;

fn default_config_version() -> u32 {
    CONFIG_VERSION
}

/// Recovery data registered at setup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecoveryInfo {
    pub email: String,
    pub phone: Option<String>,
    pub hint: Option<String>,
}

impl RecoveryInfo {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            phone: None,
            hint: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// What the user gets to see when starting a recovery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryPrompt {
    pub hint: Option<String>,
    pub masked_email: String,
    pub masked_phone: Option<String>,
}

/// Summary counts for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VaultStats {
    pub total: usize,
    /// Non-empty categories in `Category::ALL` order
    pub per_category: Vec<(Category, usize)>,
    /// Entries whose secret scores Weak or Fair
    pub weak_secrets: usize,
}
