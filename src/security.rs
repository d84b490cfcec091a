//! Clipboard handling for revealed secrets.

use crate::error::{Result, VaultError};
use copypasta::{ClipboardContext, ClipboardProvider};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Clipboard manager for secure clipboard operations.
pub struct ClipboardManager;

impl ClipboardManager {
    /// Copy text, wait `timeout_secs`, then clear the clipboard unless
    /// something else was copied in the meantime.
    pub async fn copy_and_clear_after(text: &str, timeout_secs: u64) -> Result<()> {
        Self::copy(text)?;
        sleep(Duration::from_secs(timeout_secs)).await;

        if let Ok(current) = Self::get_contents() {
            if current == text {
                Self::clear()?;
                debug!("clipboard cleared");
            }
        }

        Ok(())
    }

    /// Copy text to clipboard.
    pub fn copy(text: &str) -> Result<()> {
        let mut ctx = ClipboardContext::new().map_err(|_| VaultError::ClipboardFailed)?;

        ctx.set_contents(text.to_string())
            .map_err(|_| VaultError::ClipboardFailed)?;

        Ok(())
    }

    /// Get clipboard contents.
    pub fn get_contents() -> Result<String> {
        let mut ctx = ClipboardContext::new().map_err(|_| VaultError::ClipboardFailed)?;

        ctx.get_contents().map_err(|_| VaultError::ClipboardFailed)
    }

    /// Clear clipboard.
    pub fn clear() -> Result<()> {
        Self::copy("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_copy_then_clear() {
        // Needs a display server; skipped in CI
        if std::env::var("CI").is_ok() || ClipboardManager::get_contents().is_err() {
            return;
        }

        ClipboardManager::copy_and_clear_after("passvault_clipboard_test", 0)
            .await
            .unwrap();
        if let Ok(content) = ClipboardManager::get_contents() {
            assert_ne!(content, "passvault_clipboard_test");
        }
    }
}
