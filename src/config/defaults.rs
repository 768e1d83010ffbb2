//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default protocol name.
pub const PROTOCOL: &str = "snmp";

/// Default document watch interval in seconds.
pub const POLL_INTERVAL_SECS: u64 = 5;

/// Capacity of the serve-mode event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Default document watch interval as Duration.
#[must_use]
pub const fn poll_interval() -> Duration {
    Duration::from_secs(POLL_INTERVAL_SECS)
}
