//! peerconf: address-keyed protocol peer configuration
//!
//! A library for resolving per-address connection attributes (SNMP, AMI)
//! from an ordered rule document, splicing runtime overrides into the live
//! document, and reloading it when the persisted copy changes.

pub mod address;
pub mod attributes;
pub mod config;
pub mod event;
pub mod peer;
pub mod persist;
pub mod store;
