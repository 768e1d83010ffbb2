//! Application startup and utilities.
//!
//! This module contains exit codes, tracing setup, and error hints
//! that support the main entry point.

use peerconf::config::{ConfigError, field};
use peerconf::store::{LoadError, StoreError};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::run::RunError;

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration error (exit code 1) - invalid args, missing required fields, etc.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Runtime error (exit code 2) - unreadable document, failed save, etc.
    ///
    /// Note: This is a function rather than a constant because `ExitCode::from()` is not `const fn`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Prints helpful hints for common configuration errors.
pub fn print_config_hint(error: &ConfigError) {
    if matches!(
        error,
        ConfigError::MissingRequired {
            field: field::DOCUMENT,
            ..
        } | ConfigError::FileRead { .. }
    ) {
        eprintln!("\nRun 'peerconf init' to generate a configuration template.");
    }
}

/// Prints helpful hints for common runtime errors.
pub fn print_run_hint(error: &RunError) {
    if let RunError::Store(StoreError::Load(load)) = error {
        if load.is_not_found() {
            eprintln!(
                "\nRun 'peerconf init --document <path>' to generate a peer document template."
            );
        } else if matches!(load, LoadError::Schema { .. }) {
            eprintln!("\nFix the peer document and run 'peerconf list' to check it.");
        }
    }
}

/// Sets up the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries command output.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
