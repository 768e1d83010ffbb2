//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while assembling operator settings.
///
/// The peer document itself is never read here; its errors belong to the store.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("Failed to read settings file '{}': {source}", path.display())]
    FileRead {
        /// Settings file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML or has unknown keys.
    #[error("Failed to parse settings file: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A template could not be written by `init`.
    #[error("Failed to write '{}': {source}", path.display())]
    FileWrite {
        /// Template path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A setting with no default was given by neither the CLI nor the file.
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired {
        /// Name of the missing field
        field: &'static str,
        /// Hint for how to provide the value
        hint: &'static str,
    },

    /// A zero interval.
    #[error("Invalid duration for {field}: {reason}")]
    InvalidDuration {
        /// Name of the field
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid protocol name.
    #[error("Invalid protocol '{value}': expected snmp or ami")]
    InvalidProtocol {
        /// The invalid value provided
        value: String,
    },

    /// Invalid document format name.
    #[error("Invalid document format '{value}': expected toml or json")]
    InvalidFormat {
        /// The invalid value provided
        value: String,
    },

    /// Invalid attribute assignment.
    #[error("Invalid assignment '{value}': expected 'Name=Value'")]
    InvalidAssignment {
        /// The invalid assignment string
        value: String,
    },
}

/// Well-known field names for `MissingRequired` errors.
///
/// Use these constants for compile-time safety when matching field names.
pub mod field {
    /// The peer document path field.
    pub const DOCUMENT: &str = "document";
}

impl ConfigError {
    /// Creates a `MissingRequired` error for a required field.
    #[must_use]
    pub const fn missing(field: &'static str, hint: &'static str) -> Self {
        Self::MissingRequired { field, hint }
    }
}
