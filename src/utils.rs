//! Utility functions for masking and terminal output.

use colored::*;
use std::path::Path;

#[cfg(unix)]
use std::fs;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Mask an email for display: `tharun@gmail.com` becomes `th***@gmail.com`.
/// Local parts of two characters or fewer are hidden entirely.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            if local.chars().count() > 2 {
                let visible: String = local.chars().take(2).collect();
                format!("{visible}***@{domain}")
            } else {
                format!("***@{domain}")
            }
        }
        None if email.is_empty() => String::new(),
        None => "***".to_string(),
    }
}

/// Mask a phone number, keeping the last four characters.
pub fn mask_phone(phone: &str) -> String {
    let count = phone.chars().count();
    if count > 4 {
        let tail: String = phone.chars().skip(count - 4).collect();
        format!("***{tail}")
    } else {
        "***".to_string()
    }
}

/// Replace every character of a secret with `*`.
pub fn mask_secret(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}

/// Check file permissions and return warnings.
#[cfg_attr(not(unix), allow(unused_variables))]
pub fn check_file_permissions(path: &Path) -> Vec<String> {
    let mut warnings = Vec::new();

    #[cfg(unix)]
    {
        if let Ok(metadata) = fs::metadata(path) {
            let mode = metadata.permissions().mode();

            // Group or others have any access
            if mode & 0o077 != 0 {
                warnings.push(format!(
                    "{} has insecure permissions: {:o}. Run 'chmod {} {}' to fix.",
                    path.display(),
                    mode & 0o777,
                    if metadata.is_dir() { "700" } else { "600" },
                    path.display()
                ));
            }
        }
    }

    warnings
}

/// Warn when running as root.
pub fn check_process_permissions() -> Vec<String> {
    let mut warnings = Vec::new();

    #[cfg(unix)]
    {
        if unsafe { libc::geteuid() } == 0 {
            warnings.push("Running as root is not recommended".to_string());
        }
    }

    warnings
}

/// Print an error message and exit.
pub fn error_exit(message: &str, code: i32) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), message);
    std::process::exit(code);
}

/// Print a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "Warning:".yellow(), message);
}
