//! Asterisk Manager Interface (AMI) agent attributes.

use serde::{Deserialize, Serialize};

use super::{AttributeSet, layered};

/// Compiled-in AMI defaults.
pub mod defaults {
    /// Default manager username.
    pub const USERNAME: &str = "opennms";
    /// Default manager password.
    pub const PASSWORD: &str = "opennms";
    /// Default manager TCP port.
    pub const PORT: u16 = 5038;
    /// Default request timeout in milliseconds.
    pub const TIMEOUT_MS: u32 = 1500;
    /// Default retry count.
    pub const RETRIES: u32 = 1;
}

/// AMI attribute overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AmiAttributes {
    /// Manager username
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Manager password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Manager TCP port
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Connect over TLS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_tls: Option<bool>,

    /// Request timeout in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,

    /// Retry count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
}

/// Fully-resolved AMI agent configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AmiAgentConfig {
    /// Manager username
    pub username: String,
    /// Manager password
    pub password: String,
    /// Manager TCP port
    pub port: u16,
    /// Connect over TLS
    pub use_tls: bool,
    /// Request timeout in milliseconds
    pub timeout: u32,
    /// Retry count
    pub retries: u32,
}

impl AttributeSet for AmiAttributes {
    type Resolved = AmiAgentConfig;

    const PROTOCOL: &'static str = "ami";

    fn resolve(&self, defaults: &Self) -> AmiAgentConfig {
        AmiAgentConfig {
            username: layered(
                self.username.as_ref(),
                defaults.username.as_ref(),
                defaults::USERNAME.to_string(),
            ),
            password: layered(
                self.password.as_ref(),
                defaults.password.as_ref(),
                defaults::PASSWORD.to_string(),
            ),
            port: layered(self.port.as_ref(), defaults.port.as_ref(), defaults::PORT),
            use_tls: layered(self.use_tls.as_ref(), defaults.use_tls.as_ref(), false),
            timeout: layered(
                self.timeout.as_ref(),
                defaults.timeout.as_ref(),
                defaults::TIMEOUT_MS,
            ),
            retries: layered(self.retries.as_ref(), defaults.retries.as_ref(), defaults::RETRIES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_fill_unset_layers() {
        let resolved = AmiAttributes::default().resolve(&AmiAttributes::default());
        assert_eq!(resolved.username, "opennms");
        assert_eq!(resolved.password, "opennms");
        assert_eq!(resolved.port, 5038);
        assert!(!resolved.use_tls);
        assert_eq!(resolved.timeout, 1500);
        assert_eq!(resolved.retries, 1);
    }

    #[test]
    fn username_and_password_fall_back_independently() {
        let global = AmiAttributes {
            username: Some("admin".to_string()),
            password: Some("global-secret".to_string()),
            ..AmiAttributes::default()
        };
        let over = AmiAttributes {
            password: Some("local-secret".to_string()),
            ..AmiAttributes::default()
        };

        let resolved = over.resolve(&global);
        assert_eq!(resolved.username, "admin");
        assert_eq!(resolved.password, "local-secret");
    }

    #[test]
    fn timeout_and_retries_use_global_when_unset() {
        let global = AmiAttributes {
            timeout: Some(9000),
            retries: Some(4),
            ..AmiAttributes::default()
        };
        let resolved = AmiAttributes::default().resolve(&global);
        assert_eq!(resolved.timeout, 9000);
        assert_eq!(resolved.retries, 4);
    }
}
