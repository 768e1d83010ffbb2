//! Tests for event decoding and dispatch.

use std::net::Ipv4Addr;

use crate::address::{AddressError, AddressRange};
use crate::attributes::{AmiAttributes, SecurityLevel, SnmpAttributes, SnmpVersion};
use crate::event::{
    ConfigEvent, Dispatched, EventError, EventMessage, EventParams, FromEventParams,
    ReconfigureEvent, dispatch, param,
};
use crate::peer::{MergeOutcome, MergeTarget};
use crate::persist::{DocumentFormat, MemoryDocumentStore};
use crate::store::{ConfigStore, StoreError};

fn addr(text: &str) -> Ipv4Addr {
    text.parse().unwrap()
}

fn target_params(first: &str) -> EventParams {
    EventParams::new().with(param::FIRST_IP_ADDRESS, first)
}

mod params {
    use super::*;

    #[test]
    fn blank_values_are_absent() {
        let params = EventParams::new().with("communityString", "   ");
        assert_eq!(params.get("communityString"), None);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn values_are_trimmed() {
        let params = EventParams::new().with("port", " 1161 ");
        assert_eq!(params.parse::<u16>("port").unwrap(), Some(1161));
    }

    #[test]
    fn invalid_number_names_the_parameter() {
        let params = EventParams::new().with(param::TIMEOUT, "soon");

        let err = params.parse::<u32>(param::TIMEOUT).unwrap_err();

        assert!(matches!(
            err,
            EventError::InvalidParameter { name: "timeout", ref value, .. } if value == "soon"
        ));
    }

    #[test]
    fn collects_from_pairs() {
        let params: EventParams = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(params.get("b"), Some("2"));
    }
}

mod snmp_params {
    use super::*;

    #[test]
    fn maps_recognized_parameters() {
        let params = target_params("10.0.0.1")
            .with(param::COMMUNITY_STRING, "lan")
            .with(param::VERSION, "v2c")
            .with(param::TIMEOUT, "900")
            .with(param::RETRY_COUNT, "0")
            .with(param::PORT, "1161")
            .with(param::SECURITY_LEVEL, "2")
            .with("nodeLabel", "ignored");

        let attributes = SnmpAttributes::from_params(&params).unwrap();

        assert_eq!(attributes.read_community.as_deref(), Some("lan"));
        assert_eq!(attributes.version, Some(SnmpVersion::V2c));
        assert_eq!(attributes.timeout, Some(900));
        assert_eq!(attributes.retries, Some(0));
        assert_eq!(attributes.port, Some(1161));
        assert_eq!(attributes.security_level, Some(SecurityLevel::AuthNoPriv));
        assert_eq!(attributes.write_community, None);
    }

    #[test]
    fn no_parameters_means_no_overrides() {
        let attributes = SnmpAttributes::from_params(&EventParams::new()).unwrap();
        assert_eq!(attributes, SnmpAttributes::default());
    }

    #[test]
    fn rejects_unknown_version() {
        let params = EventParams::new().with(param::VERSION, "v4");
        assert!(matches!(
            SnmpAttributes::from_params(&params),
            Err(EventError::InvalidParameter { name: "version", .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_port() {
        let params = EventParams::new().with(param::PORT, "70000");
        assert!(SnmpAttributes::from_params(&params).is_err());
    }
}

mod ami_params {
    use super::*;

    #[test]
    fn maps_recognized_parameters() {
        let params = EventParams::new()
            .with(param::USERNAME, "manager")
            .with(param::PASSWORD, "s3cret")
            .with(param::USE_TLS, "yes")
            .with(param::RETRY_COUNT, "3");

        let attributes = AmiAttributes::from_params(&params).unwrap();

        assert_eq!(attributes.username.as_deref(), Some("manager"));
        assert_eq!(attributes.password.as_deref(), Some("s3cret"));
        assert_eq!(attributes.use_tls, Some(true));
        assert_eq!(attributes.retries, Some(3));
        assert_eq!(attributes.port, None);
    }

    #[test]
    fn rejects_invalid_flag() {
        let params = EventParams::new().with(param::USE_TLS, "maybe");
        assert!(AmiAttributes::from_params(&params).is_err());
    }
}

mod reconfigure_event {
    use super::*;

    #[test]
    fn first_address_alone_is_specific() {
        let event: ReconfigureEvent<SnmpAttributes> =
            ReconfigureEvent::from_params(&target_params("10.1.1.7")).unwrap();
        assert_eq!(event.target, MergeTarget::Specific(addr("10.1.1.7")));
    }

    #[test]
    fn equal_first_and_last_is_specific() {
        let params = target_params("10.1.1.7").with(param::LAST_IP_ADDRESS, "10.1.1.7");
        let event: ReconfigureEvent<SnmpAttributes> = ReconfigureEvent::from_params(&params).unwrap();
        assert_eq!(event.target, MergeTarget::Specific(addr("10.1.1.7")));
    }

    #[test]
    fn first_and_last_form_a_range() {
        let params = target_params("10.1.1.1").with(param::LAST_IP_ADDRESS, "10.1.1.9");
        let event: ReconfigureEvent<SnmpAttributes> = ReconfigureEvent::from_params(&params).unwrap();
        assert_eq!(
            event.target,
            MergeTarget::Range(AddressRange::new(addr("10.1.1.1"), addr("10.1.1.9")).unwrap())
        );
    }

    #[test]
    fn missing_first_address_fails() {
        let params = EventParams::new().with(param::COMMUNITY_STRING, "lan");
        let result: Result<ReconfigureEvent<SnmpAttributes>, _> =
            ReconfigureEvent::from_params(&params);
        assert!(matches!(
            result,
            Err(EventError::MissingParameter {
                name: "firstIPAddress"
            })
        ));
    }

    #[test]
    fn reversed_addresses_fail() {
        let params = target_params("10.1.1.9").with(param::LAST_IP_ADDRESS, "10.1.1.1");
        let result: Result<ReconfigureEvent<SnmpAttributes>, _> =
            ReconfigureEvent::from_params(&params);
        assert!(matches!(
            result,
            Err(EventError::Target(AddressError::Reversed { .. }))
        ));
    }

    #[test]
    fn malformed_address_fails() {
        let result: Result<ReconfigureEvent<SnmpAttributes>, _> =
            ReconfigureEvent::from_params(&target_params("10.1.1"));
        assert!(matches!(
            result,
            Err(EventError::InvalidParameter {
                name: "firstIPAddress",
                ..
            })
        ));
    }
}

mod decoding {
    use super::*;

    #[test]
    fn decodes_reconfigure_message() {
        let line = r#"{"event":"reconfigure","params":{"firstIPAddress":"10.0.0.1","communityString":"lan"}}"#;

        let event: ConfigEvent<SnmpAttributes> = ConfigEvent::decode(line).unwrap();

        let ConfigEvent::Reconfigure(event) = event else {
            panic!("expected a reconfigure event");
        };
        assert_eq!(event.target, MergeTarget::Specific(addr("10.0.0.1")));
        assert_eq!(event.attributes.read_community.as_deref(), Some("lan"));
    }

    #[test]
    fn decodes_reload_message() {
        let event: ConfigEvent<AmiAttributes> = ConfigEvent::decode(r#"{"event":"reload"}"#).unwrap();
        assert_eq!(event, ConfigEvent::Reload);
    }

    #[test]
    fn rejects_unknown_kind() {
        let result: Result<ConfigEvent<SnmpAttributes>, _> =
            ConfigEvent::decode(r#"{"event":"restart"}"#);
        assert!(matches!(result, Err(EventError::Decode(_))));
    }

    #[test]
    fn message_roundtrips_through_json() {
        let message = EventMessage::Reconfigure {
            params: target_params("10.0.0.1"),
        };
        let text = serde_json::to_string(&message).unwrap();
        assert_eq!(serde_json::from_str::<EventMessage>(&text).unwrap(), message);
    }
}

mod dispatching {
    use super::*;

    fn store() -> ConfigStore<SnmpAttributes, MemoryDocumentStore> {
        let store = ConfigStore::new(
            MemoryDocumentStore::with_contents("[defaults]\nread-community = \"public\"\n"),
            DocumentFormat::Toml,
        );
        store.load().unwrap();
        store
    }

    #[test]
    fn reconfigure_merges() {
        let store = store();
        let params = target_params("10.0.0.1").with(param::COMMUNITY_STRING, "lan");
        let event = ConfigEvent::Reconfigure(ReconfigureEvent::from_params(&params).unwrap());

        let dispatched = dispatch(&store, event).unwrap();

        assert_eq!(
            dispatched,
            Dispatched::Merged(MergeOutcome::Inserted { conflict: None })
        );
        assert_eq!(store.resolve(addr("10.0.0.1")).unwrap().read_community, "lan");
    }

    #[test]
    fn reload_reloads() {
        let store = store();
        store
            .persistence()
            .replace("[defaults]\nread-community = \"edited\"\n");

        let dispatched = dispatch(&store, ConfigEvent::Reload).unwrap();

        assert_eq!(dispatched, Dispatched::Reloaded);
        assert_eq!(store.resolve(addr("10.0.0.1")).unwrap().read_community, "edited");
    }

    #[test]
    fn unloaded_store_is_reported() {
        let store: ConfigStore<SnmpAttributes, _> =
            ConfigStore::new(MemoryDocumentStore::new(), DocumentFormat::Toml);
        let event = ConfigEvent::Reconfigure(ReconfigureEvent::new(
            addr("10.0.0.1"),
            SnmpAttributes::default(),
        ));

        let result = dispatch(&store, event);

        assert!(matches!(
            result,
            Err(EventError::Store(StoreError::NotInitialized))
        ));
    }
}
