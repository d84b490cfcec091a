//! Main entry point for passvault.

use anyhow::Context;
use clap::Parser;
use passvault::cli::Cli;
use passvault::utils::{check_process_permissions, error_exit, warning};
use passvault::VaultError;

#[tokio::main]
async fn main() {
    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    init_tracing(if cli.verbose { "debug" } else { "warn" });

    for warn in check_process_permissions() {
        warning(&warn);
    }

    if let Err(e) = run(&cli).await {
        let code = match e.downcast_ref::<VaultError>() {
            Some(VaultError::Cancelled) => 130,
            Some(err) if err.is_fatal() => 2,
            _ => 1,
        };
        error_exit(&format!("{e:#}"), code);
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let dir = cli.data_dir();
    cli.execute()
        .await
        .with_context(|| format!("vault at {}", dir.display()))
}

/// Log to stderr so JSON output on stdout stays parseable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("passvault={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
