//! SNMP agent attributes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{AttributeSet, layered};

/// Compiled-in SNMP defaults.
pub mod defaults {
    use super::SnmpVersion;

    /// Default protocol version.
    pub const VERSION: SnmpVersion = SnmpVersion::V1;
    /// Default agent UDP port.
    pub const PORT: u16 = 161;
    /// Default request timeout in milliseconds.
    pub const TIMEOUT_MS: u32 = 3000;
    /// Default retry count.
    pub const RETRIES: u32 = 1;
    /// Default read community.
    pub const READ_COMMUNITY: &str = "public";
    /// Default write community.
    pub const WRITE_COMMUNITY: &str = "private";
    /// Default varbinds per PDU.
    pub const MAX_VARS_PER_PDU: u32 = 10;
    /// Default GETBULK max-repetitions.
    pub const MAX_REPETITIONS: u32 = 2;
    /// Default maximum request size in bytes.
    pub const MAX_REQUEST_SIZE: u32 = 65535;
    /// Default `SNMPv3` security name.
    pub const SECURITY_NAME: &str = "opennmsUser";
    /// Default `SNMPv3` authentication protocol.
    pub const AUTH_PROTOCOL: &str = "MD5";
    /// Default `SNMPv3` privacy protocol.
    pub const PRIVACY_PROTOCOL: &str = "DES";
}

/// SNMP protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnmpVersion {
    /// `SNMPv1`
    #[serde(rename = "v1")]
    V1,
    /// `SNMPv2c`
    #[serde(rename = "v2c")]
    V2c,
    /// `SNMPv3`
    #[serde(rename = "v3")]
    V3,
}

impl SnmpVersion {
    /// Parses a version name (`v1`, `v2c`, `v3`, case-insensitive, `v` optional).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().trim_start_matches('v') {
            "1" => Some(Self::V1),
            "2" | "2c" => Some(Self::V2c),
            "3" => Some(Self::V3),
            _ => None,
        }
    }
}

impl fmt::Display for SnmpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => write!(f, "v1"),
            Self::V2c => write!(f, "v2c"),
            Self::V3 => write!(f, "v3"),
        }
    }
}

/// `SNMPv3` security level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecurityLevel {
    /// No authentication, no privacy.
    NoAuthNoPriv,
    /// Authentication without privacy.
    AuthNoPriv,
    /// Authentication and privacy.
    AuthPriv,
}

/// SNMP attribute overrides for one definition or for the global defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SnmpAttributes {
    /// Protocol version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<SnmpVersion>,

    /// Agent UDP port
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Request timeout in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,

    /// Retry count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,

    /// Read community string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_community: Option<String>,

    /// Write community string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_community: Option<String>,

    /// Maximum varbinds per PDU
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_vars_per_pdu: Option<u32>,

    /// GETBULK max-repetitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_repetitions: Option<u32>,

    /// Maximum request size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_request_size: Option<u32>,

    /// `SNMPv3` security name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_name: Option<String>,

    /// `SNMPv3` security level; derived from the passphrases when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_level: Option<SecurityLevel>,

    /// `SNMPv3` authentication passphrase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_passphrase: Option<String>,

    /// `SNMPv3` authentication protocol
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_protocol: Option<String>,

    /// `SNMPv3` privacy passphrase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_passphrase: Option<String>,

    /// `SNMPv3` privacy protocol
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_protocol: Option<String>,

    /// Proxy host to send requests through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_host: Option<String>,
}

/// Fully-resolved SNMP agent configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SnmpAgentConfig {
    /// Protocol version
    pub version: SnmpVersion,
    /// Agent UDP port
    pub port: u16,
    /// Request timeout in milliseconds
    pub timeout: u32,
    /// Retry count
    pub retries: u32,
    /// Read community string
    pub read_community: String,
    /// Write community string
    pub write_community: String,
    /// Maximum varbinds per PDU
    pub max_vars_per_pdu: u32,
    /// GETBULK max-repetitions
    pub max_repetitions: u32,
    /// Maximum request size in bytes
    pub max_request_size: u32,
    /// `SNMPv3` security name
    pub security_name: String,
    /// `SNMPv3` security level
    pub security_level: SecurityLevel,
    /// `SNMPv3` authentication passphrase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_passphrase: Option<String>,
    /// `SNMPv3` authentication protocol
    pub auth_protocol: String,
    /// `SNMPv3` privacy passphrase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_passphrase: Option<String>,
    /// `SNMPv3` privacy protocol
    pub privacy_protocol: String,
    /// Proxy host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_host: Option<String>,
}

impl AttributeSet for SnmpAttributes {
    type Resolved = SnmpAgentConfig;

    const PROTOCOL: &'static str = "snmp";

    fn resolve(&self, defaults: &Self) -> SnmpAgentConfig {
        let auth_passphrase = self
            .auth_passphrase
            .as_ref()
            .or(defaults.auth_passphrase.as_ref())
            .cloned();
        let privacy_passphrase = self
            .privacy_passphrase
            .as_ref()
            .or(defaults.privacy_passphrase.as_ref())
            .cloned();
        let derived_level = match (&auth_passphrase, &privacy_passphrase) {
            (None, _) => SecurityLevel::NoAuthNoPriv,
            (Some(_), None) => SecurityLevel::AuthNoPriv,
            (Some(_), Some(_)) => SecurityLevel::AuthPriv,
        };

        SnmpAgentConfig {
            version: layered(self.version.as_ref(), defaults.version.as_ref(), defaults::VERSION),
            port: layered(self.port.as_ref(), defaults.port.as_ref(), defaults::PORT),
            timeout: layered(
                self.timeout.as_ref(),
                defaults.timeout.as_ref(),
                defaults::TIMEOUT_MS,
            ),
            retries: layered(self.retries.as_ref(), defaults.retries.as_ref(), defaults::RETRIES),
            read_community: layered(
                self.read_community.as_ref(),
                defaults.read_community.as_ref(),
                defaults::READ_COMMUNITY.to_string(),
            ),
            write_community: layered(
                self.write_community.as_ref(),
                defaults.write_community.as_ref(),
                defaults::WRITE_COMMUNITY.to_string(),
            ),
            max_vars_per_pdu: layered(
                self.max_vars_per_pdu.as_ref(),
                defaults.max_vars_per_pdu.as_ref(),
                defaults::MAX_VARS_PER_PDU,
            ),
            max_repetitions: layered(
                self.max_repetitions.as_ref(),
                defaults.max_repetitions.as_ref(),
                defaults::MAX_REPETITIONS,
            ),
            max_request_size: layered(
                self.max_request_size.as_ref(),
                defaults.max_request_size.as_ref(),
                defaults::MAX_REQUEST_SIZE,
            ),
            security_name: layered(
                self.security_name.as_ref(),
                defaults.security_name.as_ref(),
                defaults::SECURITY_NAME.to_string(),
            ),
            security_level: layered(
                self.security_level.as_ref(),
                defaults.security_level.as_ref(),
                derived_level,
            ),
            auth_passphrase,
            auth_protocol: layered(
                self.auth_protocol.as_ref(),
                defaults.auth_protocol.as_ref(),
                defaults::AUTH_PROTOCOL.to_string(),
            ),
            privacy_passphrase,
            privacy_protocol: layered(
                self.privacy_protocol.as_ref(),
                defaults.privacy_protocol.as_ref(),
                defaults::PRIVACY_PROTOCOL.to_string(),
            ),
            proxy_host: self
                .proxy_host
                .as_ref()
                .or(defaults.proxy_host.as_ref())
                .cloned(),
        }
    }
}
