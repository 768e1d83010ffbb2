//! Protocol connection attribute sets.
//!
//! Address matching is shared by every protocol; only the attribute payload
//! differs. Each protocol supplies one [`AttributeSet`] implementation whose
//! fields are all optional overrides, plus a fully-resolved agent config type.
//!
//! # Fallback
//!
//! Each attribute is resolved independently, highest layer first:
//!
//! 1. **Definition override** - the matched definition's value
//! 2. **Global default** - the document-level `[defaults]` value
//! 3. **Compiled-in constant** - the protocol's built-in default

pub mod ami;
pub mod snmp;

use std::fmt::{self, Debug};

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use ami::{AmiAgentConfig, AmiAttributes};
pub use snmp::{SecurityLevel, SnmpAgentConfig, SnmpAttributes, SnmpVersion};

/// An override set of protocol connection attributes.
///
/// `Default` must be the empty override set (every attribute unset).
pub trait AttributeSet:
    Clone + Default + PartialEq + Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// The fully-resolved attributes handed to a protocol client.
    type Resolved: Clone + PartialEq + Debug + Send + Sync + Serialize;

    /// Short protocol name used in logs.
    const PROTOCOL: &'static str;

    /// Resolves every attribute using `self` as the override layer and
    /// `defaults` as the global-default layer.
    fn resolve(&self, defaults: &Self) -> Self::Resolved;

    /// Returns true if no attribute is overridden.
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The protocols with an [`AttributeSet`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Protocol {
    /// SNMP agents ([`SnmpAttributes`]).
    #[default]
    Snmp,
    /// Asterisk Manager Interface ([`AmiAttributes`]).
    Ami,
}

impl Protocol {
    /// Returns the protocol name (`snmp` or `ami`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Snmp => SnmpAttributes::PROTOCOL,
            Self::Ami => AmiAttributes::PROTOCOL,
        }
    }

    /// Parses a protocol name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Snmp, Self::Ami]
            .into_iter()
            .find(|protocol| protocol.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Picks the first set layer, falling back to the compiled-in constant.
pub(crate) fn layered<T: Clone>(over: Option<&T>, global: Option<&T>, fallback: T) -> T {
    over.or(global).cloned().unwrap_or(fallback)
}
