//! Address-keyed peer definitions and the documents that hold them.
//!
//! This module provides:
//! - Rule representation ([`Definition`], [`PeerDocument`])
//! - First-match resolution ([`matcher`])
//! - Canonicalization of address coverage ([`normalize`])
//! - Runtime override splicing ([`merge`])
//!
//! # Priority
//!
//! A document's definitions are ordered: index 0 has the highest priority.
//! Coverage of different definitions may overlap; the matcher resolves the
//! overlap by order, never by rejecting it.

pub mod matcher;
pub mod merge;
pub mod normalize;

#[cfg(test)]
mod normalize_tests;

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use serde::de::{self, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};

use crate::address::{AddressRange, AddressText, IpPattern};
use crate::attributes::AttributeSet;

pub use matcher::{Match, MatchKind, find_match, resolve};
pub use merge::{MergeOutcome, MergeTarget, merge};
pub use normalize::{normalize, normalize_list};

/// One rule: address coverage mapped to an attribute override set.
///
/// Coverage is the union of `specifics`, `ranges`, and `patterns`. After
/// [`normalize`], specifics are sorted and never inside or next to a range,
/// and ranges are sorted, disjoint, and pairwise non-adjacent.
///
/// Deserialization rejects keys that are neither coverage nor one of the
/// attribute set's fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition<A> {
    /// Attribute overrides applied when this definition matches.
    #[serde(flatten)]
    pub attributes: A,

    /// Individually listed addresses.
    #[serde(rename = "specific", skip_serializing_if = "Vec::is_empty")]
    pub specifics: Vec<Ipv4Addr>,

    /// Wildcard patterns. Never canonicalized.
    #[serde(rename = "ip-match", skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<IpPattern>,

    /// Inclusive address ranges. Kept last so TOML output lists plain values
    /// before the range tables.
    #[serde(rename = "range", skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<AddressRange>,
}

/// Read side of [`Definition`].
///
/// The flattened attribute set claims its own keys first; whatever is left
/// over lands in `unknown`.
#[derive(Deserialize)]
struct RawDefinition<A> {
    #[serde(flatten)]
    attributes: A,

    #[serde(default, rename = "specific")]
    specifics: Vec<AddressText>,

    #[serde(default, rename = "ip-match")]
    patterns: Vec<IpPattern>,

    #[serde(default, rename = "range")]
    ranges: Vec<AddressRange>,

    #[serde(flatten)]
    unknown: BTreeMap<String, IgnoredAny>,
}

impl<'de, A: Deserialize<'de>> Deserialize<'de> for Definition<A> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawDefinition::<A>::deserialize(deserializer)?;

        if let Some(key) = raw.unknown.keys().next() {
            return Err(de::Error::custom(format_args!(
                "unknown field `{key}` in definition"
            )));
        }

        Ok(Self {
            attributes: raw.attributes,
            specifics: raw.specifics.into_iter().map(|addr| addr.0).collect(),
            patterns: raw.patterns,
            ranges: raw.ranges,
        })
    }
}

impl<A> Definition<A> {
    /// Creates a definition with the given overrides and no coverage.
    #[must_use]
    pub const fn new(attributes: A) -> Self {
        Self {
            attributes,
            specifics: Vec::new(),
            patterns: Vec::new(),
            ranges: Vec::new(),
        }
    }

    /// Adds a specific address (builder pattern).
    #[must_use]
    pub fn with_specific(mut self, addr: Ipv4Addr) -> Self {
        self.specifics.push(addr);
        self
    }

    /// Adds a range (builder pattern).
    #[must_use]
    pub fn with_range(mut self, range: AddressRange) -> Self {
        self.ranges.push(range);
        self
    }

    /// Adds a wildcard pattern (builder pattern).
    #[must_use]
    pub fn with_pattern(mut self, pattern: IpPattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Returns true if the definition covers no address at all.
    #[must_use]
    pub fn has_no_coverage(&self) -> bool {
        self.specifics.is_empty() && self.ranges.is_empty() && self.patterns.is_empty()
    }

    /// Tests membership in specific, range, pattern order.
    ///
    /// Returns the first kind of coverage that contains `addr`.
    #[must_use]
    pub fn match_kind(&self, addr: Ipv4Addr) -> Option<MatchKind> {
        if self.specifics.contains(&addr) {
            Some(MatchKind::Specific)
        } else if self.ranges.iter().any(|range| range.contains(addr)) {
            Some(MatchKind::Range)
        } else if self.patterns.iter().any(|pattern| pattern.matches(addr)) {
            Some(MatchKind::Pattern)
        } else {
            None
        }
    }

    /// Returns true if `addr` is covered.
    #[must_use]
    pub fn covers(&self, addr: Ipv4Addr) -> bool {
        self.match_kind(addr).is_some()
    }

    /// Returns true if any address of `span` is covered.
    #[must_use]
    pub fn covers_any(&self, span: &AddressRange) -> bool {
        self.specifics.iter().any(|addr| span.contains(*addr))
            || self.ranges.iter().any(|range| range.overlaps(span))
            || self.patterns.iter().any(|pattern| pattern.intersects(span))
    }
}

/// The complete rule set for one protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerDocument<A> {
    /// Global default overrides, used when a definition leaves an attribute
    /// unset or when no definition matches.
    #[serde(default)]
    pub defaults: A,

    /// Definitions in priority order.
    #[serde(default, rename = "definition", skip_serializing_if = "Vec::is_empty")]
    pub definitions: Vec<Definition<A>>,
}

impl<A: Default> Default for PeerDocument<A> {
    fn default() -> Self {
        Self {
            defaults: A::default(),
            definitions: Vec::new(),
        }
    }
}

impl<A: AttributeSet> PeerDocument<A> {
    /// Creates a document with the given global defaults and no definitions.
    #[must_use]
    pub const fn new(defaults: A) -> Self {
        Self {
            defaults,
            definitions: Vec::new(),
        }
    }

    /// Appends a definition at the lowest priority (builder pattern).
    #[must_use]
    pub fn with_definition(mut self, definition: Definition<A>) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Resolves the attributes for an address.
    #[must_use]
    pub fn resolve(&self, addr: Ipv4Addr) -> A::Resolved {
        resolve(addr, self)
    }

    /// Canonicalizes every definition and drops those without coverage.
    ///
    /// Returns the number of definitions dropped.
    pub fn normalize(&mut self) -> usize {
        normalize_list(&mut self.definitions)
    }

    /// Total number of specific addresses, ranges, and patterns.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.definitions
            .iter()
            .map(|d| d.specifics.len() + d.ranges.len() + d.patterns.len())
            .sum()
    }
}
