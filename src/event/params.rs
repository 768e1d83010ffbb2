//! Notification parameters and their mapping onto attribute overrides.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attributes::{AmiAttributes, AttributeSet, SecurityLevel, SnmpAttributes, SnmpVersion};

use super::EventError;

/// Recognized parameter names.
pub mod param {
    /// First (or only) target address.
    pub const FIRST_IP_ADDRESS: &str = "firstIPAddress";
    /// Last target address of a range.
    pub const LAST_IP_ADDRESS: &str = "lastIPAddress";

    /// SNMP read community.
    pub const COMMUNITY_STRING: &str = "communityString";
    /// SNMP write community.
    pub const WRITE_COMMUNITY_STRING: &str = "writeCommunityString";
    /// SNMP version (`v1`, `v2c`, `v3`).
    pub const VERSION: &str = "version";
    /// Agent port.
    pub const PORT: &str = "port";
    /// Timeout in milliseconds.
    pub const TIMEOUT: &str = "timeout";
    /// Retry count.
    pub const RETRY_COUNT: &str = "retryCount";
    /// SNMP variables per PDU.
    pub const MAX_VARS_PER_PDU: &str = "maxVarsPerPdu";
    /// SNMP GETBULK repetitions.
    pub const MAX_REPETITIONS: &str = "maxRepetitions";
    /// SNMP maximum request size.
    pub const MAX_REQUEST_SIZE: &str = "maxRequestSize";
    /// `SNMPv3` security name.
    pub const SECURITY_NAME: &str = "securityName";
    /// `SNMPv3` security level (name or 1-3).
    pub const SECURITY_LEVEL: &str = "securityLevel";
    /// `SNMPv3` authentication passphrase.
    pub const AUTH_PASSPHRASE: &str = "authPassPhrase";
    /// `SNMPv3` authentication protocol.
    pub const AUTH_PROTOCOL: &str = "authProtocol";
    /// `SNMPv3` privacy passphrase.
    pub const PRIVACY_PASSPHRASE: &str = "privacyPassPhrase";
    /// `SNMPv3` privacy protocol.
    pub const PRIVACY_PROTOCOL: &str = "privacyProtocol";
    /// SNMP proxy host.
    pub const PROXY_HOST: &str = "proxyHost";

    /// AMI username.
    pub const USERNAME: &str = "username";
    /// AMI password.
    pub const PASSWORD: &str = "password";
    /// AMI TLS switch.
    pub const USE_TLS: &str = "useTls";
}

/// Name/value parameters carried by a notification.
///
/// Blank values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventParams(BTreeMap<String, String>);

impl EventParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter (builder pattern).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a parameter, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Returns the trimmed value of `name`, if present and not blank.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Returns the value of `name` as an owned string.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }

    /// Parses the value of `name` with [`FromStr`].
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidParameter`] if the value does not parse.
    pub fn parse<T>(&self, name: &'static str) -> Result<Option<T>, EventError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.get(name)
            .map(|value| {
                value.parse().map_err(|e: T::Err| EventError::InvalidParameter {
                    name,
                    value: value.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    /// Parses the value of `name` with a lookup function.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidParameter`] if `lookup` returns `None`.
    pub fn parse_with<T>(
        &self,
        name: &'static str,
        expected: &str,
        lookup: impl FnOnce(&str) -> Option<T>,
    ) -> Result<Option<T>, EventError> {
        self.get(name)
            .map(|value| {
                lookup(value).ok_or_else(|| EventError::InvalidParameter {
                    name,
                    value: value.to_string(),
                    reason: format!("expected {expected}"),
                })
            })
            .transpose()
    }

    /// Number of parameters, blank ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EventParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Attribute sets that can be built from notification parameters.
///
/// Unrecognized parameters are ignored; absent ones stay unset.
pub trait FromEventParams: AttributeSet {
    /// Builds an override set from `params`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidParameter`] for a recognized parameter
    /// whose value cannot be interpreted.
    fn from_params(params: &EventParams) -> Result<Self, EventError>;
}

impl FromEventParams for SnmpAttributes {
    fn from_params(params: &EventParams) -> Result<Self, EventError> {
        Ok(Self {
            version: params.parse_with(param::VERSION, "v1, v2c or v3", SnmpVersion::from_name)?,
            port: params.parse(param::PORT)?,
            timeout: params.parse(param::TIMEOUT)?,
            retries: params.parse(param::RETRY_COUNT)?,
            read_community: params.text(param::COMMUNITY_STRING),
            write_community: params.text(param::WRITE_COMMUNITY_STRING),
            max_vars_per_pdu: params.parse(param::MAX_VARS_PER_PDU)?,
            max_repetitions: params.parse(param::MAX_REPETITIONS)?,
            max_request_size: params.parse(param::MAX_REQUEST_SIZE)?,
            security_name: params.text(param::SECURITY_NAME),
            security_level: params.parse_with(
                param::SECURITY_LEVEL,
                "noAuthNoPriv, authNoPriv, authPriv or 1-3",
                security_level_from,
            )?,
            auth_passphrase: params.text(param::AUTH_PASSPHRASE),
            auth_protocol: params.text(param::AUTH_PROTOCOL),
            privacy_passphrase: params.text(param::PRIVACY_PASSPHRASE),
            privacy_protocol: params.text(param::PRIVACY_PROTOCOL),
            proxy_host: params.text(param::PROXY_HOST),
        })
    }
}

impl FromEventParams for AmiAttributes {
    fn from_params(params: &EventParams) -> Result<Self, EventError> {
        Ok(Self {
            username: params.text(param::USERNAME),
            password: params.text(param::PASSWORD),
            port: params.parse(param::PORT)?,
            use_tls: params.parse_with(param::USE_TLS, "true or false", flag_from)?,
            timeout: params.parse(param::TIMEOUT)?,
            retries: params.parse(param::RETRY_COUNT)?,
        })
    }
}

fn security_level_from(text: &str) -> Option<SecurityLevel> {
    match text.to_ascii_lowercase().as_str() {
        "1" | "noauthnopriv" => Some(SecurityLevel::NoAuthNoPriv),
        "2" | "authnopriv" => Some(SecurityLevel::AuthNoPriv),
        "3" | "authpriv" => Some(SecurityLevel::AuthPriv),
        _ => None,
    }
}

fn flag_from(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
