//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use crate::attributes::Protocol;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Peer document section
    #[serde(default)]
    pub document: DocumentSection,

    /// Store behavior section
    #[serde(default)]
    pub store: StoreSection,

    /// Document watch section
    #[serde(default)]
    pub watch: WatchSection,
}

/// Peer document section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentSection {
    /// Path to the peer document
    pub path: Option<String>,

    /// Protocol: "snmp" or "ami"
    pub protocol: Option<String>,

    /// Encoding: "toml" or "json"
    pub format: Option<String>,
}

/// Store behavior section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    /// Normalize the document every time it is loaded
    #[serde(default)]
    pub optimize_on_load: bool,

    /// Save after every reconfigure event
    #[serde(default)]
    pub save_on_reconfigure: bool,
}

/// Document watch section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Poll interval in seconds
    pub poll_interval: Option<u64>,

    /// Disable watching
    #[serde(default)]
    pub disabled: bool,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# peerconf configuration file

[document]
# Path to the peer document (required, or pass --document)
path = "peers.toml"

# Protocol the document configures: "snmp" or "ami" (default: snmp)
# protocol = "snmp"

# Document encoding: "toml" or "json" (default: from the file extension)
# format = "toml"

[store]
# Normalize the document every time it is loaded
# optimize_on_load = false

# Save the document after every reconfigure event (serve only)
# save_on_reconfigure = false

[watch]
# Seconds between document change checks (default: 5)
poll_interval = 5

# Disable reloading on document changes
# disabled = false
"#
    .to_string()
}

/// Generates a commented peer document for `protocol`.
///
/// The template parses as an empty document.
#[must_use]
pub fn default_document_template(protocol: Protocol) -> String {
    let attributes = match protocol {
        Protocol::Snmp => {
            r#"# version = "v2c"
# port = 161
# timeout = 3000
# retries = 1
# read-community = "public"
# write-community = "private""#
        }
        Protocol::Ami => {
            r#"# username = "opennms"
# password = "opennms"
# port = 5038
# use-tls = false
# timeout = 1500
# retries = 1"#
        }
    };

    format!(
        r#"# peerconf {protocol} peer document
version = 1

# Global defaults, used when a definition leaves an attribute unset
# or when no definition matches.
[defaults]
{attributes}

# Definitions, highest priority first. Each covers specific addresses,
# inclusive ranges, and wildcard patterns (per octet: *, n, a-b, lists).
#
# [[definition]]
# specific = ["192.0.2.10"]
# ip-match = ["10.1-3.*.1,254"]
#
# [[definition.range]]
# begin = "192.0.2.100"
# end = "192.0.2.199"
"#
    )
}
