//! Operator settings for the peerconf binary.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Template generation ([`write_default_config`], [`write_document_template`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! The document path has no default and must come from the CLI or the file.
//! The document format, when given by neither, follows the document's file
//! extension.
//!
//! # Boolean Flag Semantics
//!
//! Boolean flags (`--optimize-on-load`, `--save-on-reconfigure`, `--no-watch`)
//! use OR semantics: set in either CLI or TOML, the result is set. CLI flags
//! cannot turn off what the file turns on.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod toml_tests;
#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command, FormatArg, ProtocolArg};
pub use error::{ConfigError, field};
pub use toml::{TomlConfig, default_config_template, default_document_template};
pub use validated::{
    ValidatedConfig, parse_assignments, write_default_config, write_document_template,
};
