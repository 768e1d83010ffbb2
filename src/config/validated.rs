//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::attributes::Protocol;
use crate::event::EventParams;
use crate::persist::DocumentFormat;
use crate::store::StoreOptions;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::{TomlConfig, default_config_template, default_document_template};

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ValidatedConfig {
    /// Path to the peer document (required)
    pub document: PathBuf,

    /// Protocol the document configures
    pub protocol: Protocol,

    /// Document encoding
    pub format: DocumentFormat,

    /// Normalize the document on every load
    pub optimize_on_load: bool,

    /// Save after every reconfigure event
    pub save_on_reconfigure: bool,

    /// Document watch interval
    pub poll_interval: Duration,

    /// Whether to watch the document for changes
    pub watch: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let watch = if self.watch {
            format!("{}s", self.poll_interval.as_secs())
        } else {
            "off".to_string()
        };

        write!(
            f,
            "Config {{ document: {}, protocol: {}, format: {}, optimize_on_load: {}, \
             save_on_reconfigure: {}, watch: {} }}",
            self.document.display(),
            self.protocol,
            self.format,
            self.optimize_on_load,
            self.save_on_reconfigure,
            watch,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The document path is missing
    /// - The protocol or format name is invalid
    /// - The poll interval is zero
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let document = Self::resolve_document(cli, toml)?;
        let protocol = Self::resolve_protocol(cli, toml)?;
        let format = Self::resolve_format(cli, toml, &document)?;
        let poll_interval = Self::resolve_poll_interval(cli, toml)?;

        // Flags only enable, never disable
        let optimize_on_load =
            cli.optimize_on_load || toml.is_some_and(|t| t.store.optimize_on_load);
        let save_on_reconfigure =
            cli.save_on_reconfigure || toml.is_some_and(|t| t.store.save_on_reconfigure);
        let watch = !(cli.no_watch || toml.is_some_and(|t| t.watch.disabled));

        Ok(Self {
            document,
            protocol,
            format,
            optimize_on_load,
            save_on_reconfigure,
            poll_interval,
            watch,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    /// Store options carried by this configuration.
    #[must_use]
    pub const fn store_options(&self) -> StoreOptions {
        StoreOptions {
            optimize_on_load: self.optimize_on_load,
        }
    }

    fn resolve_document(cli: &Cli, toml: Option<&TomlConfig>) -> Result<PathBuf, ConfigError> {
        // CLI takes precedence
        if let Some(ref path) = cli.document {
            return Ok(path.clone());
        }

        toml.and_then(|t| t.document.path.as_ref().map(PathBuf::from))
            .ok_or_else(|| {
                ConfigError::missing(
                    field::DOCUMENT,
                    "Use --document or set document.path in config file",
                )
            })
    }

    fn resolve_protocol(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Protocol, ConfigError> {
        if let Some(protocol) = cli.protocol {
            return Ok(protocol.into());
        }

        let name = toml
            .and_then(|t| t.document.protocol.as_deref())
            .unwrap_or(defaults::PROTOCOL);

        Protocol::from_name(name).ok_or_else(|| ConfigError::InvalidProtocol {
            value: name.to_string(),
        })
    }

    fn resolve_format(
        cli: &Cli,
        toml: Option<&TomlConfig>,
        document: &Path,
    ) -> Result<DocumentFormat, ConfigError> {
        if let Some(format) = cli.format {
            return Ok(format.into());
        }

        match toml.and_then(|t| t.document.format.as_deref()) {
            Some(name) => DocumentFormat::from_name(name).ok_or_else(|| {
                ConfigError::InvalidFormat {
                    value: name.to_string(),
                }
            }),
            None => Ok(DocumentFormat::from_path(document)),
        }
    }

    fn resolve_poll_interval(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Duration, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let seconds = cli
            .poll_interval
            .or_else(|| toml.and_then(|t| t.watch.poll_interval))
            .unwrap_or(defaults::POLL_INTERVAL_SECS);

        if seconds == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "poll_interval",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_secs(seconds))
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    write_file(path, &default_config_template())
}

/// Writes a peer document template for `protocol`, unless `path` exists.
///
/// Returns `false` if the file already existed and was left alone.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_document_template(path: &Path, protocol: Protocol) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }
    write_file(path, &default_document_template(protocol))?;
    Ok(true)
}

fn write_file(path: &Path, contents: &str) -> Result<(), ConfigError> {
    std::fs::write(path, contents).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Parses `Name=Value` assignments into event parameters.
///
/// Later assignments of the same name win.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidAssignment`] for an entry without `=` or
/// with an empty name.
pub fn parse_assignments<S: AsRef<str>>(assignments: &[S]) -> Result<EventParams, ConfigError> {
    let mut params = EventParams::new();
    for assignment in assignments {
        let assignment = assignment.as_ref();
        let (name, value) = assignment
            .split_once('=')
            .filter(|(name, _)| !name.trim().is_empty())
            .ok_or_else(|| ConfigError::InvalidAssignment {
                value: assignment.to_string(),
            })?;
        params.insert(name.trim(), value.trim());
    }
    Ok(params)
}
