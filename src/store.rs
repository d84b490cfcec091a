//! Credential store: CRUD, search and categorization over the vault entries.
//!
//! Every mutation is written to disk before it is applied in memory, so a
//! failed write leaves both unchanged.

use crate::catalog;
use crate::error::{Result, VaultError};
use crate::models::{Category, CredentialEntry, EntryKey, EntryUpdate, VaultStats};
use crate::storage::Storage;
use crate::strength::{self, Strength};
use chrono::Utc;
use tracing::{debug, info};

/// The ordered collection of credential entries for one vault.
pub struct CredentialStore {
    storage: Storage,
    entries: Vec<CredentialEntry>,
}

impl CredentialStore {
    /// Load entries from storage. Only reachable through an authenticated
    /// [`crate::vault::PasswordVault`].
    pub(crate) fn open(storage: Storage) -> Result<Self> {
        let entries = storage.load_vault()?;
        Ok(Self { storage, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in insertion order.
    pub fn list_all(&self) -> &[CredentialEntry] {
        &self.entries
    }

    pub fn get(&self, key: &EntryKey) -> Option<&CredentialEntry> {
        self.entries.iter().find(|e| key.matches(e))
    }

    /// Add an entry. Without an explicit category the account name is
    /// looked up in the service catalog, falling back to `Other`.
    pub fn add_entry(
        &mut self,
        account: &str,
        login_identifier: &str,
        secret: &str,
        category: Option<Category>,
    ) -> Result<CredentialEntry> {
        let account = account.trim();
        let login_identifier = login_identifier.trim();
        validate(account, secret)?;

        let key = EntryKey::new(account, login_identifier);
        if self.get(&key).is_some() {
            return Err(VaultError::DuplicateEntry(key.to_string()));
        }

        let now = Utc::now();
        let entry = CredentialEntry {
            account: account.to_string(),
            login_identifier: login_identifier.to_string(),
            secret: secret.to_string(),
            category: category.unwrap_or_else(|| catalog::categorize(account)),
            created_at: now,
            updated_at: now,
        };

        let mut next = self.entries.clone();
        next.push(entry.clone());
        self.commit(next)?;

        info!(account, category = %entry.category, "added entry");
        Ok(entry)
    }

    /// Apply field changes to an entry and refresh its `updated_at`.
    /// An empty update changes nothing.
    pub fn update_entry(&mut self, key: &EntryKey, update: EntryUpdate) -> Result<CredentialEntry> {
        let index = self.index_of(key)?;
        if update.is_empty() {
            return Ok(self.entries[index].clone());
        }

        let mut entry = self.entries[index].clone();
        if let Some(account) = update.account {
            entry.account = account.trim().to_string();
        }
        if let Some(login_identifier) = update.login_identifier {
            entry.login_identifier = login_identifier.trim().to_string();
        }
        if let Some(secret) = update.secret {
            entry.secret = secret;
        }
        if let Some(category) = update.category {
            entry.category = category;
        }
        validate(&entry.account, &entry.secret)?;

        let new_key = entry.key();
        let clash = self
            .entries
            .iter()
            .enumerate()
            .any(|(i, other)| i != index && new_key.matches(other));
        if clash {
            return Err(VaultError::DuplicateEntry(new_key.to_string()));
        }

        entry.updated_at = Utc::now();
        let mut next = self.entries.clone();
        next[index] = entry.clone();
        self.commit(next)?;

        info!(account = %entry.account, "updated entry");
        Ok(entry)
    }

    /// Remove one entry and return it.
    pub fn delete_entry(&mut self, key: &EntryKey) -> Result<CredentialEntry> {
        let index = self.index_of(key)?;

        let mut next = self.entries.clone();
        let removed = next.remove(index);
        self.commit(next)?;

        info!(account = %removed.account, "deleted entry");
        Ok(removed)
    }

    /// Remove several entries at once. If any key is missing nothing is
    /// deleted and the first missing key is reported.
    pub fn delete_entries(&mut self, keys: &[EntryKey]) -> Result<usize> {
        if let Some(missing) = keys.iter().find(|k| self.get(k).is_none()) {
            return Err(VaultError::EntryNotFound(missing.to_string()));
        }

        let next: Vec<CredentialEntry> = self
            .entries
            .iter()
            .filter(|e| !keys.iter().any(|k| k.matches(e)))
            .cloned()
            .collect();
        let removed = self.entries.len() - next.len();
        self.commit(next)?;

        info!(count = removed, "deleted entries");
        Ok(removed)
    }

    /// Remove every entry. Returns how many were removed.
    pub fn clear_all(&mut self) -> Result<usize> {
        let removed = self.entries.len();
        self.commit(Vec::new())?;
        info!(count = removed, "cleared vault");
        Ok(removed)
    }

    /// Entries whose account or login identifier contains `query`,
    /// ignoring case. Lazy; clone the iterator to restart it.
    pub fn search(&self, query: &str) -> Search<'_> {
        debug!(query_len = query.len(), "search");
        Search {
            entries: self.entries.iter(),
            query: query.to_lowercase(),
        }
    }

    /// Entries in one category, in stored order.
    pub fn filter_by_category(
        &self,
        category: Category,
    ) -> impl Iterator<Item = &CredentialEntry> + Clone + '_ {
        self.entries.iter().filter(move |e| e.category == category)
    }

    /// Dashboard counts.
    pub fn stats(&self) -> VaultStats {
        let per_category = Category::ALL
            .iter()
            .map(|c| (*c, self.filter_by_category(*c).count()))
            .filter(|(_, count)| *count > 0)
            .collect();
        let weak_secrets = self
            .entries
            .iter()
            .filter(|e| strength::score(&e.secret) <= Strength::Fair)
            .count();

        VaultStats {
            total: self.entries.len(),
            per_category,
            weak_secrets,
        }
    }

    fn index_of(&self, key: &EntryKey) -> Result<usize> {
        self.entries
            .iter()
            .position(|e| key.matches(e))
            .ok_or_else(|| VaultError::EntryNotFound(key.to_string()))
    }

    fn commit(&mut self, next: Vec<CredentialEntry>) -> Result<()> {
        self.storage.save_vault(&next)?;
        self.entries = next;
        Ok(())
    }
}

fn validate(account: &str, secret: &str) -> Result<()> {
    if account.trim().is_empty() {
        return Err(VaultError::InvalidEntry("account must not be empty".to_string()));
    }
    if secret.is_empty() {
        return Err(VaultError::InvalidEntry("secret must not be empty".to_string()));
    }
    Ok(())
}

/// Lazy search over the store, see [`CredentialStore::search`].
#[derive(Clone)]
pub struct Search<'a> {
    entries: std::slice::Iter<'a, CredentialEntry>,
    query: String,
}

impl<'a> Iterator for Search<'a> {
    type Item = &'a CredentialEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let query = &self.query;
        self.entries.find(|e| {
            e.account.to_lowercase().contains(query.as_str())
                || e.login_identifier.to_lowercase().contains(query.as_str())
        })
    }
}
