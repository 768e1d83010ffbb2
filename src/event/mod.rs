//! Reconfiguration and reload notifications.
//!
//! Two kinds of notification reach a [`ConfigStore`]:
//! - "reconfigure one address or range" ([`ReconfigureEvent`]), routed to
//!   [`ConfigStore::merge`]
//! - "the persisted document changed" ([`ConfigEvent::Reload`]), routed to
//!   [`ConfigStore::reload`]
//!
//! [`dispatch`] is the plain function for both. Delivery mechanics live in
//! [`listener`] and [`watch`].

pub mod listener;
mod params;
pub mod watch;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use listener::{EventListener, ListenerOptions, ListenerSummary};
pub use params::{EventParams, FromEventParams, param};
pub use watch::DocumentWatcher;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::{AddressError, parse_address};
use crate::attributes::AttributeSet;
use crate::peer::{MergeOutcome, MergeTarget};
use crate::persist::DocumentStore;
use crate::store::{ConfigStore, StoreError};

/// Errors raised while decoding or handling an event.
#[derive(Debug, Error)]
pub enum EventError {
    /// A required parameter is absent or blank.
    #[error("Missing event parameter '{name}'")]
    MissingParameter {
        /// Parameter name
        name: &'static str,
    },

    /// A parameter value could not be interpreted.
    #[error("Invalid value '{value}' for event parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// The offending value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// The first and last addresses do not form a range.
    #[error("Invalid event target: {0}")]
    Target(#[source] AddressError),

    /// An encoded event could not be decoded.
    #[error("Malformed event message: {0}")]
    Decode(#[source] serde_json::Error),

    /// The store rejected the event.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The override was merged into the live document but saving it failed.
    #[error("Override merged ({outcome:?}) but not saved: {source}")]
    Unsaved {
        /// What the merge did
        outcome: MergeOutcome,
        /// Why the save failed
        #[source]
        source: StoreError,
    },

    /// The handler task panicked or was cancelled.
    #[error("Event handler task failed: {0}")]
    Task(#[source] tokio::task::JoinError),
}

/// A request to apply attribute overrides to one address or range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconfigureEvent<A> {
    /// Addresses the overrides apply to.
    pub target: MergeTarget,
    /// The overrides.
    pub attributes: A,
}

impl<A> ReconfigureEvent<A> {
    /// Creates an event for `target`.
    #[must_use]
    pub fn new(target: impl Into<MergeTarget>, attributes: A) -> Self {
        Self {
            target: target.into(),
            attributes,
        }
    }
}

impl<A: FromEventParams> ReconfigureEvent<A> {
    /// Builds an event from notification parameters.
    ///
    /// `firstIPAddress` is required. `lastIPAddress` is optional; when absent
    /// or equal to the first address the target is a single address.
    ///
    /// # Errors
    ///
    /// Returns an [`EventError`] if the addresses or any recognized attribute
    /// parameter cannot be parsed.
    pub fn from_params(params: &EventParams) -> Result<Self, EventError> {
        let first = address_param(params, param::FIRST_IP_ADDRESS)?
            .ok_or(EventError::MissingParameter {
                name: param::FIRST_IP_ADDRESS,
            })?;
        let last = address_param(params, param::LAST_IP_ADDRESS)?;
        let target = MergeTarget::new(first, last).map_err(EventError::Target)?;

        Ok(Self {
            target,
            attributes: A::from_params(params)?,
        })
    }
}

fn address_param(
    params: &EventParams,
    name: &'static str,
) -> Result<Option<std::net::Ipv4Addr>, EventError> {
    params
        .get(name)
        .map(|value| {
            parse_address(value).map_err(|e| EventError::InvalidParameter {
                name,
                value: value.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

/// A notification for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEvent<A> {
    /// Splice an override into the live document.
    Reconfigure(ReconfigureEvent<A>),
    /// Replace the live document with the persisted one.
    Reload,
}

impl<A: FromEventParams> ConfigEvent<A> {
    /// Decodes one JSON-encoded [`EventMessage`].
    ///
    /// # Errors
    ///
    /// Returns an [`EventError`] if the text is not a valid message or its
    /// parameters are invalid.
    pub fn decode(text: &str) -> Result<Self, EventError> {
        let message: EventMessage = serde_json::from_str(text).map_err(EventError::Decode)?;
        Self::try_from(message)
    }
}

impl<A: FromEventParams> TryFrom<EventMessage> for ConfigEvent<A> {
    type Error = EventError;

    fn try_from(message: EventMessage) -> Result<Self, Self::Error> {
        match message {
            EventMessage::Reconfigure { params } => {
                ReconfigureEvent::from_params(&params).map(Self::Reconfigure)
            }
            EventMessage::Reload => Ok(Self::Reload),
        }
    }
}

/// Wire form of an event, one JSON object per message.
///
/// ```json
/// {"event": "reconfigure", "params": {"firstIPAddress": "10.0.0.1", "communityString": "lan"}}
/// {"event": "reload"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum EventMessage {
    /// Reconfigure one address or range.
    Reconfigure {
        /// Notification parameters.
        #[serde(default)]
        params: EventParams,
    },
    /// Reload the persisted document.
    Reload,
}

/// What handling an event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// An override was merged.
    Merged(MergeOutcome),
    /// The document was reloaded.
    Reloaded,
}

/// Routes an event to the matching store operation.
///
/// # Errors
///
/// Returns [`EventError::Store`] if the store operation fails.
pub fn dispatch<A, S>(store: &ConfigStore<A, S>, event: ConfigEvent<A>) -> Result<Dispatched, EventError>
where
    A: AttributeSet,
    S: DocumentStore,
{
    match event {
        ConfigEvent::Reconfigure(ReconfigureEvent { target, attributes }) => {
            Ok(Dispatched::Merged(store.merge(target, attributes)?))
        }
        ConfigEvent::Reload => {
            store.reload()?;
            Ok(Dispatched::Reloaded)
        }
    }
}
