//! Tests for TOML configuration parsing.

use super::toml::{TomlConfig, default_config_template, default_document_template};
use crate::attributes::{AmiAttributes, Protocol, SnmpAttributes};
use crate::peer::PeerDocument;
use crate::persist::DocumentFormat;

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let config = TomlConfig::parse(
            r#"
            [document]
            path = "/var/lib/peerconf/peers.toml"
        "#,
        )
        .unwrap();

        assert_eq!(
            config.document.path.as_deref(),
            Some("/var/lib/peerconf/peers.toml")
        );
        assert_eq!(config.document.protocol, None);
        assert!(!config.store.optimize_on_load);
        assert_eq!(config.watch.poll_interval, None);
    }

    #[test]
    fn parse_full_config() {
        let config = TomlConfig::parse(
            r#"
            [document]
            path = "peers.json"
            protocol = "ami"
            format = "json"

            [store]
            optimize_on_load = true
            save_on_reconfigure = true

            [watch]
            poll_interval = 30
            disabled = true
        "#,
        )
        .unwrap();

        assert_eq!(config.document.protocol.as_deref(), Some("ami"));
        assert_eq!(config.document.format.as_deref(), Some("json"));
        assert!(config.store.optimize_on_load);
        assert!(config.store.save_on_reconfigure);
        assert_eq!(config.watch.poll_interval, Some(30));
        assert!(config.watch.disabled);
    }

    #[test]
    fn empty_config_is_valid() {
        let config = TomlConfig::parse("").unwrap();
        assert!(config.document.path.is_none());
    }

    #[test]
    fn rejects_unknown_section() {
        assert!(TomlConfig::parse("[server]\nport = 1\n").is_err());
    }

    #[test]
    fn rejects_unknown_key() {
        assert!(TomlConfig::parse("[store]\nautosave = true\n").is_err());
    }
}

mod templates {
    use super::*;

    #[test]
    fn config_template_parses() {
        let config = TomlConfig::parse(&default_config_template()).unwrap();

        assert_eq!(config.document.path.as_deref(), Some("peers.toml"));
        assert_eq!(config.watch.poll_interval, Some(5));
    }

    #[test]
    fn snmp_document_template_is_an_empty_document() {
        let text = default_document_template(Protocol::Snmp);

        let document: PeerDocument<SnmpAttributes> =
            DocumentFormat::Toml.parse(text.as_bytes()).unwrap();

        assert_eq!(document, PeerDocument::default());
        assert!(text.contains("read-community"));
    }

    #[test]
    fn ami_document_template_is_an_empty_document() {
        let text = default_document_template(Protocol::Ami);

        let document: PeerDocument<AmiAttributes> =
            DocumentFormat::Toml.parse(text.as_bytes()).unwrap();

        assert_eq!(document, PeerDocument::default());
        assert!(text.contains("use-tls"));
    }
}
