//! Command-line interface implementation.

use crate::auth::MIN_MASTER_PASSWORD_LENGTH;
use crate::catalog;
use crate::error::{Result, VaultError};
use crate::generator::{self, DEFAULT_LENGTH};
use crate::models::{Category, CredentialEntry, EntryKey, EntryUpdate, RecoveryInfo};
use crate::security::ClipboardManager;
use crate::storage;
use crate::strength::{self, Strength};
use crate::utils::{self, mask_secret, success, warning};
use crate::vault::PasswordVault;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use serde::Serialize;
use std::io::{self, Read};
use std::path::PathBuf;
use zeroize::Zeroizing;

/// Local, offline password vault.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Vault data directory
    #[arg(
        short = 'd',
        long,
        global = true,
        env = "PASSVAULT_DIR",
        help = "Vault data directory (default: ~/.password_vault_pro)"
    )]
    pub dir: Option<PathBuf>,

    /// Master password for non-interactive use
    #[arg(
        long,
        global = true,
        env = "PASSVAULT_PASSWORD",
        hide_env_values = true,
        hide = true
    )]
    pub master_password: Option<String>,

    /// Output format
    #[arg(
        short = 'o',
        long,
        global = true,
        value_enum,
        default_value = "text",
        help = "Output format"
    )]
    pub output: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the vault and set the master password
    Init {
        /// Recovery email (required)
        #[arg(short, long)]
        email: Option<String>,

        /// Recovery phone number
        #[arg(short, long)]
        phone: Option<String>,

        /// Recovery hint
        #[arg(long)]
        hint: Option<String>,
    },

    /// Store a new credential
    Add {
        /// Service or site name
        account: String,

        /// Username or email used at the service
        #[arg(short, long, default_value = "")]
        login: String,

        /// Category (default: detected from the service name)
        #[arg(short, long)]
        category: Option<Category>,

        /// Generate a random secret instead of prompting
        #[arg(short, long)]
        generate: bool,

        /// Length of the generated secret
        #[arg(long, default_value_t = DEFAULT_LENGTH)]
        length: usize,

        /// Read the secret from stdin
        #[arg(short = 'i', long)]
        stdin: bool,
    },

    /// List stored credentials
    List {
        /// Only show one category
        #[arg(short, long)]
        category: Option<Category>,
    },

    /// Search accounts and logins
    Search {
        /// Case-insensitive substring
        query: String,
    },

    /// Show one credential
    Show {
        account: String,

        /// Login identifier (needed when the account has several)
        #[arg(short, long)]
        login: Option<String>,

        /// Print the secret in plaintext
        #[arg(short, long)]
        reveal: bool,

        /// Copy the secret to the clipboard
        #[arg(short, long)]
        clipboard: bool,

        /// Seconds before the clipboard is cleared
        #[arg(short = 't', long, default_value = "30")]
        timeout: u64,
    },

    /// Change a stored credential
    Edit {
        account: String,

        /// Current login identifier
        #[arg(short, long, default_value = "")]
        login: String,

        /// New service name
        #[arg(long)]
        new_account: Option<String>,

        /// New login identifier
        #[arg(long)]
        new_login: Option<String>,

        /// New category
        #[arg(short, long)]
        category: Option<Category>,

        /// Prompt for a new secret
        #[arg(short, long)]
        secret: bool,

        /// Read the new secret from stdin
        #[arg(short = 'i', long)]
        stdin: bool,
    },

    /// Delete one or more credentials, all or nothing
    Delete {
        /// Entries as ACCOUNT:LOGIN
        #[arg(required = true)]
        keys: Vec<EntryKey>,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete every credential
    Clear {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Reset a forgotten master password
    Recover {
        /// Registered recovery email
        #[arg(short, long)]
        email: Option<String>,

        /// Registered recovery hint
        #[arg(long)]
        hint: Option<String>,

        /// New master password for non-interactive use
        #[arg(long, env = "PASSVAULT_NEW_PASSWORD", hide_env_values = true, hide = true)]
        new_password: Option<String>,
    },

    /// Generate a random password
    Generate {
        #[arg(short, long, default_value_t = DEFAULT_LENGTH)]
        length: usize,
    },

    /// Rate a password
    Strength {
        /// Password to rate (prompted when omitted)
        password: Option<String>,
    },

    /// List known services for quick-add
    Catalog {
        #[arg(short, long)]
        category: Option<Category>,
    },

    /// Show vault statistics
    Stats,

    /// Delete the vault and its master password
    Reset {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Entry as printed; the secret only appears when revealed.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryView<'a> {
    account: &'a str,
    login_identifier: &'a str,
    category: Category,
    strength: Strength,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret: Option<&'a str>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'a> EntryView<'a> {
    fn new(entry: &'a CredentialEntry, reveal: bool) -> Self {
        Self {
            account: &entry.account,
            login_identifier: &entry.login_identifier,
            category: entry.category,
            strength: strength::score(&entry.secret),
            secret: reveal.then_some(entry.secret.as_str()),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

impl Cli {
    /// Get the vault data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(storage::default_data_dir)
    }

    /// Execute the CLI command.
    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Init { email, phone, hint } => {
                self.init_vault(email.clone(), phone.clone(), hint.clone())
            }
            Commands::Add {
                account,
                login,
                category,
                generate,
                length,
                stdin,
            } => self.add_entry(account, login, *category, *generate, *length, *stdin),
            Commands::List { category } => self.list_entries(*category),
            Commands::Search { query } => self.search_entries(query),
            Commands::Show {
                account,
                login,
                reveal,
                clipboard,
                timeout,
            } => {
                self.show_entry(account, login.as_deref(), *reveal, *clipboard, *timeout)
                    .await
            }
            Commands::Edit {
                account,
                login,
                new_account,
                new_login,
                category,
                secret,
                stdin,
            } => {
                let update = EntryUpdate {
                    account: new_account.clone(),
                    login_identifier: new_login.clone(),
                    secret: if *stdin {
                        Some(read_stdin_secret()?.to_string())
                    } else if *secret {
                        Some(prompt_secret("New secret")?.to_string())
                    } else {
                        None
                    },
                    category: *category,
                };
                self.edit_entry(&EntryKey::new(account.as_str(), login.as_str()), update)
            }
            Commands::Delete { keys, yes } => self.delete_entries(keys, *yes),
            Commands::Clear { yes } => self.clear_entries(*yes),
            Commands::Recover {
                email,
                hint,
                new_password,
            } => self.recover(email.clone(), hint.clone(), new_password.clone()),
            Commands::Generate { length } => self.generate(*length),
            Commands::Strength { password } => self.rate(password.clone()),
            Commands::Catalog { category } => self.show_catalog(*category),
            Commands::Stats => self.show_stats(),
            Commands::Reset { yes } => self.reset_vault(*yes),
        }
    }

    /// Create the vault.
    fn init_vault(
        &self,
        email: Option<String>,
        phone: Option<String>,
        hint: Option<String>,
    ) -> Result<()> {
        let mut vault = PasswordVault::open(self.data_dir())?;
        if vault.is_initialized() {
            return Err(VaultError::AlreadyInitialized);
        }

        let password = match &self.master_password {
            Some(p) => Zeroizing::new(p.clone()),
            None => prompt_new_master_password("Choose a master password")?,
        };
        let email = match email {
            Some(e) => e,
            None => prompt_text("Recovery email", false)?,
        };
        let phone = match phone {
            Some(p) => Some(p),
            None if is_interactive() => non_empty(prompt_text("Recovery phone (optional)", true)?),
            None => None,
        };
        let hint = match hint {
            Some(h) => Some(h),
            None if is_interactive() => non_empty(prompt_text("Recovery hint (optional)", true)?),
            None => None,
        };

        let report = strength::analyze(&password);
        vault.setup_master_password(
            &password,
            RecoveryInfo {
                email,
                phone,
                hint,
            },
        )?;

        success(&format!("Vault created at {}", vault.dir().display()));
        if report.strength <= Strength::Fair {
            warning(&format!(
                "Master password strength is {}; consider a longer one",
                report.strength
            ));
        }
        Ok(())
    }

    /// Open the vault and log in.
    fn unlock(&self) -> Result<PasswordVault> {
        let mut vault = PasswordVault::open(self.data_dir())?;
        if !vault.is_initialized() {
            return Err(VaultError::NotInitialized);
        }

        for warn in utils::check_file_permissions(vault.dir()) {
            warning(&warn);
        }

        let password = match &self.master_password {
            Some(p) => Zeroizing::new(p.clone()),
            None => prompt_secret("Master password")?,
        };
        vault.login(&password)?;
        Ok(vault)
    }

    fn add_entry(
        &self,
        account: &str,
        login: &str,
        category: Option<Category>,
        generate: bool,
        length: usize,
        stdin: bool,
    ) -> Result<()> {
        let mut vault = self.unlock()?;

        let secret = if generate {
            Zeroizing::new(generator::generate_password(length)?)
        } else if stdin {
            read_stdin_secret()?
        } else {
            prompt_secret(&format!("Secret for {account}"))?
        };

        let entry = vault
            .store_mut()?
            .add_entry(account, login, &secret, category)?;

        match self.output {
            OutputFormat::Text => {
                success(&format!(
                    "Saved {} ({})",
                    entry.account.bold(),
                    entry.category
                ));
                println!("Strength: {}", paint_strength(strength::score(&entry.secret)));
                if generate {
                    println!("Generated secret: {}", entry.secret);
                }
            }
            OutputFormat::Json => print_json(&EntryView::new(&entry, generate))?,
        }
        Ok(())
    }

    fn list_entries(&self, category: Option<Category>) -> Result<()> {
        let vault = self.unlock()?;
        let store = vault.store()?;

        let entries: Vec<&CredentialEntry> = match category {
            Some(c) => store.filter_by_category(c).collect(),
            None => store.list_all().iter().collect(),
        };
        self.print_entries(&entries)
    }

    fn search_entries(&self, query: &str) -> Result<()> {
        let vault = self.unlock()?;
        let entries: Vec<&CredentialEntry> = vault.store()?.search(query).collect();
        self.print_entries(&entries)
    }

    fn print_entries(&self, entries: &[&CredentialEntry]) -> Result<()> {
        match self.output {
            OutputFormat::Text => {
                if entries.is_empty() {
                    println!("No entries found");
                    return Ok(());
                }
                println!(
                    "{}",
                    format!(
                        "{:<20} {:<30} {:<14} {}",
                        "ACCOUNT", "LOGIN", "CATEGORY", "STRENGTH"
                    )
                    .bold()
                );
                for entry in entries {
                    println!(
                        "{:<20} {:<30} {:<14} {}",
                        entry.account,
                        entry.login_identifier,
                        entry.category.name(),
                        paint_strength(strength::score(&entry.secret))
                    );
                }
                Ok(())
            }
            OutputFormat::Json => {
                let views: Vec<EntryView> = entries.iter().map(|e| EntryView::new(e, false)).collect();
                print_json(&serde_json::json!({
                    "count": views.len(),
                    "entries": views,
                }))
            }
        }
    }

    async fn show_entry(
        &self,
        account: &str,
        login: Option<&str>,
        reveal: bool,
        clipboard: bool,
        timeout: u64,
    ) -> Result<()> {
        let vault = self.unlock()?;
        let store = vault.store()?;

        let entry = match login {
            Some(login) => {
                let key = EntryKey::new(account, login);
                store
                    .get(&key)
                    .ok_or_else(|| VaultError::EntryNotFound(key.to_string()))?
            }
            None => {
                let key = EntryKey::new(account, "");
                let matches: Vec<&CredentialEntry> = store
                    .list_all()
                    .iter()
                    .filter(|e| key.matches_account(e))
                    .collect();
                match matches.as_slice() {
                    [] => return Err(VaultError::EntryNotFound(account.to_string())),
                    [only] => *only,
                    many => store.get(&key).ok_or_else(|| {
                        VaultError::Other(format!(
                            "{} has {} logins; pick one with --login",
                            account,
                            many.len()
                        ))
                    })?,
                }
            }
        };

        match self.output {
            OutputFormat::Text => {
                println!("{}", "=".repeat(50));
                println!("{}: {}", "Account".bold(), entry.account);
                println!("{}: {}", "Login".bold(), entry.login_identifier);
                println!("{}: {}", "Category".bold(), entry.category);
                println!(
                    "{}: {}",
                    "Strength".bold(),
                    paint_strength(strength::score(&entry.secret))
                );
                if reveal {
                    println!("{}: {}", "Secret".bold(), entry.secret);
                } else {
                    println!("{}: {}", "Secret".bold(), mask_secret(&entry.secret));
                }
                println!(
                    "{}: {}",
                    "Updated".bold(),
                    entry.updated_at.format("%Y-%m-%d %H:%M")
                );
                println!("{}", "=".repeat(50));
            }
            OutputFormat::Json => print_json(&EntryView::new(entry, reveal))?,
        }

        if clipboard {
            success(&format!(
                "Copied to clipboard (will clear in {timeout} seconds)"
            ));
            ClipboardManager::copy_and_clear_after(&entry.secret, timeout).await?;
        }
        Ok(())
    }

    fn edit_entry(&self, key: &EntryKey, update: EntryUpdate) -> Result<()> {
        if update.is_empty() {
            return Err(VaultError::Other(
                "Nothing to change; pass --new-account, --new-login, --category or --secret"
                    .to_string(),
            ));
        }

        let mut vault = self.unlock()?;
        let entry = vault.store_mut()?.update_entry(key, update)?;

        match self.output {
            OutputFormat::Text => success(&format!("Updated {}", entry.key())),
            OutputFormat::Json => print_json(&EntryView::new(&entry, false))?,
        }
        Ok(())
    }

    fn delete_entries(&self, keys: &[EntryKey], yes: bool) -> Result<()> {
        let mut vault = self.unlock()?;

        if !yes && !confirm(&format!("Delete {} entr{}?", keys.len(), plural_y(keys.len())))? {
            return Err(VaultError::Cancelled);
        }

        let removed = vault.store_mut()?.delete_entries(keys)?;
        success(&format!("Deleted {removed} entr{}", plural_y(removed)));
        Ok(())
    }

    fn clear_entries(&self, yes: bool) -> Result<()> {
        let mut vault = self.unlock()?;
        if vault.store()?.is_empty() {
            println!("No entries to clear");
            return Ok(());
        }

        if !yes && !confirm("Delete ALL entries? This cannot be undone")? {
            return Err(VaultError::Cancelled);
        }

        let removed = vault.store_mut()?.clear_all()?;
        success(&format!("Deleted {removed} entr{}", plural_y(removed)));
        Ok(())
    }

    fn recover(
        &self,
        email: Option<String>,
        hint: Option<String>,
        new_password: Option<String>,
    ) -> Result<()> {
        let mut vault = PasswordVault::open(self.data_dir())?;
        if !vault.is_initialized() {
            return Err(VaultError::NotInitialized);
        }

        let prompt = vault.begin_recovery()?;
        if self.output == OutputFormat::Text {
            println!("{}", "Registered recovery details".bold());
            println!("  Email: {}", prompt.masked_email);
            if let Some(phone) = &prompt.masked_phone {
                println!("  Phone: {phone}");
            }
            if let Some(hint) = &prompt.hint {
                println!("  Hint:  {hint}");
            }
        }

        let email = match email {
            Some(e) => e,
            None => prompt_text("Recovery email", false)?,
        };
        let hint = match hint {
            Some(h) => h,
            None => prompt_text("Recovery hint", true)?,
        };
        vault.verify_recovery(&email, &hint)?;

        let new_password = match new_password {
            Some(p) => Zeroizing::new(p),
            None => prompt_new_master_password("New master password")?,
        };
        vault.reset_master_password(&new_password)?;

        success("Master password reset; log in with the new password");
        Ok(())
    }

    fn generate(&self, length: usize) -> Result<()> {
        let password = Zeroizing::new(generator::generate_password(length)?);
        let report = strength::analyze(&password);

        match self.output {
            OutputFormat::Text => {
                println!("{}", password.as_str());
                println!("Strength: {}", paint_strength(report.strength));
            }
            OutputFormat::Json => print_json(&serde_json::json!({
                "password": password.as_str(),
                "strength": report.strength,
            }))?,
        }
        Ok(())
    }

    fn rate(&self, password: Option<String>) -> Result<()> {
        let password = match password {
            Some(p) => Zeroizing::new(p),
            None => prompt_secret("Password to rate")?,
        };
        let report = strength::analyze(&password);

        match self.output {
            OutputFormat::Text => {
                println!("Strength: {} ({}/6)", paint_strength(report.strength), report.points);
                let checks = [
                    (report.has_lowercase, "lowercase letter"),
                    (report.has_uppercase, "uppercase letter"),
                    (report.has_digit, "digit"),
                    (report.has_symbol, "symbol"),
                    (report.length >= 8, "8+ characters"),
                    (report.length >= 12, "12+ characters"),
                ];
                for (ok, label) in checks {
                    let mark = if ok { "✓".green() } else { "✗".red() };
                    println!("  {mark} {label}");
                }
            }
            OutputFormat::Json => print_json(&report)?,
        }
        Ok(())
    }

    fn show_catalog(&self, category: Option<Category>) -> Result<()> {
        let groups: Vec<(Category, Vec<&str>)> = match category {
            Some(c) => vec![(c, catalog::services_in(c).collect())],
            None => catalog::suggestions(),
        };

        match self.output {
            OutputFormat::Text => {
                for (category, services) in groups {
                    println!("{}", category.name().bold());
                    if services.is_empty() {
                        println!("  (none)");
                    }
                    for service in services {
                        println!("  {service}");
                    }
                }
            }
            OutputFormat::Json => {
                let map: serde_json::Map<String, serde_json::Value> = groups
                    .into_iter()
                    .map(|(c, services)| (c.name().to_string(), serde_json::json!(services)))
                    .collect();
                print_json(&map)?;
            }
        }
        Ok(())
    }

    fn show_stats(&self) -> Result<()> {
        let vault = self.unlock()?;
        let stats = vault.store()?.stats();

        match self.output {
            OutputFormat::Text => {
                println!("{} passwords stored", stats.total.to_string().bold());
                for (category, count) in &stats.per_category {
                    println!("  {:<14} {}", category.name(), count);
                }
                if stats.weak_secrets > 0 {
                    warning(&format!(
                        "{} entr{} with weak or fair secrets",
                        stats.weak_secrets,
                        plural_y(stats.weak_secrets)
                    ));
                }
            }
            OutputFormat::Json => print_json(&stats)?,
        }
        Ok(())
    }

    fn reset_vault(&self, yes: bool) -> Result<()> {
        let mut vault = self.unlock()?;

        if !yes
            && !confirm("Delete the master password and ALL entries? This cannot be undone")?
        {
            return Err(VaultError::Cancelled);
        }

        vault.reset()?;
        success("Vault reset; run 'passvault init' to start over");
        Ok(())
    }
}

/// Check whether both stdin and stdout are terminals.
fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}

fn prompt_secret(prompt: &str) -> Result<Zeroizing<String>> {
    if !is_interactive() {
        return Err(VaultError::Other(format!(
            "{prompt} required; run in a terminal or set PASSVAULT_PASSWORD"
        )));
    }
    let secret = Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| VaultError::Other(e.to_string()))?;
    if secret.is_empty() {
        return Err(VaultError::Cancelled);
    }
    Ok(Zeroizing::new(secret))
}

fn prompt_new_master_password(prompt: &str) -> Result<Zeroizing<String>> {
    if !is_interactive() {
        return Err(VaultError::Other(format!(
            "{prompt} required; run in a terminal or set it through the environment"
        )));
    }
    let password = Password::new()
        .with_prompt(format!("{prompt} (min {MIN_MASTER_PASSWORD_LENGTH} characters)"))
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map_err(|e| VaultError::Other(e.to_string()))?;
    Ok(Zeroizing::new(password))
}

fn prompt_text(prompt: &str, allow_empty: bool) -> Result<String> {
    if !is_interactive() {
        if allow_empty {
            return Ok(String::new());
        }
        return Err(VaultError::Other(format!(
            "{prompt} required; pass it as an option"
        )));
    }
    Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(allow_empty)
        .interact_text()
        .map_err(|e| VaultError::Other(e.to_string()))
}

fn confirm(prompt: &str) -> Result<bool> {
    if !is_interactive() {
        return Err(VaultError::Other(
            "Confirmation required; pass --yes to skip it".to_string(),
        ));
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| VaultError::Other(e.to_string()))
}

fn read_stdin_secret() -> Result<Zeroizing<String>> {
    let mut buffer = Zeroizing::new(String::new());
    io::stdin().read_to_string(&mut buffer)?;
    Ok(Zeroizing::new(trim_line_ending(&buffer).to_string()))
}

fn trim_line_ending(input: &str) -> &str {
    input.trim_end_matches(['\r', '\n'])
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn plural_y(count: usize) -> &'static str {
    if count == 1 {
        "y"
    } else {
        "ies"
    }
}

fn paint_strength(strength: Strength) -> ColoredString {
    match strength {
        Strength::Weak => strength.label().red(),
        Strength::Fair => strength.label().yellow(),
        Strength::Good => strength.label().blue(),
        Strength::Strong | Strength::Excellent => strength.label().green(),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
