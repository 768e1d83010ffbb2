//! peerconf: address-keyed protocol peer configuration
//!
//! Entry point for the peerconf application.

use std::path::Path;
use std::process::ExitCode;

use peerconf::attributes::Protocol;
use peerconf::config::{
    Cli, Command, ValidatedConfig, write_default_config, write_document_template,
};

mod app;
mod run;

use app::{exit_code, print_config_hint, print_run_hint, setup_tracing};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Handle init subcommand
    if let Some(Command::Init { output }) = &cli.command {
        return handle_init(&cli, output);
    }

    // Load and validate configuration
    let config = match ValidatedConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    // Setup logging and run
    setup_tracing(config.verbose);
    tracing::info!("{config}");

    match run::execute(&config, &cli.command()) {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            tracing::error!("Application error: {e}");
            print_run_hint(&e);
            exit_code::runtime_error()
        }
    }
}

/// Handles the `init` subcommand.
///
/// Writes the settings template, plus a peer document template when
/// `--document` names a file that does not exist yet.
fn handle_init(cli: &Cli, output: &Path) -> ExitCode {
    if let Err(e) = write_default_config(output) {
        eprintln!("Error: {e}");
        return exit_code::CONFIG_ERROR;
    }
    println!("Configuration template written to: {}", output.display());

    let Some(document) = cli.document.as_deref() else {
        return exit_code::SUCCESS;
    };
    let protocol = cli.protocol.map_or_else(Protocol::default, Into::into);

    match write_document_template(document, protocol) {
        Ok(true) => {
            println!(
                "{protocol} peer document template written to: {}",
                document.display()
            );
            exit_code::SUCCESS
        }
        Ok(false) => {
            println!("Peer document already exists, left unchanged: {}", document.display());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
    }
}
