//! Splicing a runtime override into a live document.
//!
//! An override names one address or one inclusive range and the attributes
//! that should apply to it from now on. The override joins the first
//! definition whose attributes resolve identically, or becomes a new
//! definition at the highest priority. Lower-priority coverage of the same
//! addresses is left in place and simply shadowed by match order.

use std::fmt;
use std::net::Ipv4Addr;

use crate::address::{AddressError, AddressRange};
use crate::attributes::AttributeSet;

use super::{Definition, PeerDocument, normalize_list};

/// The addresses a runtime override applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeTarget {
    /// A single address.
    Specific(Ipv4Addr),
    /// An inclusive range of at least two addresses.
    Range(AddressRange),
}

impl MergeTarget {
    /// Builds a target from a first and optional last address.
    ///
    /// A missing last address, or one equal to the first, yields a specific.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::Reversed`] if `last` is below `first`.
    pub fn new(first: Ipv4Addr, last: Option<Ipv4Addr>) -> Result<Self, AddressError> {
        match last {
            Some(last) if last != first => AddressRange::new(first, last).map(Self::Range),
            _ => Ok(Self::Specific(first)),
        }
    }

    /// The target as a range (a single-address range for a specific).
    #[must_use]
    pub const fn span(&self) -> AddressRange {
        match self {
            Self::Specific(addr) => AddressRange::single(*addr),
            Self::Range(range) => *range,
        }
    }

    /// Returns true if `addr` is part of the target.
    #[must_use]
    pub const fn contains(&self, addr: Ipv4Addr) -> bool {
        self.span().contains(addr)
    }

    fn add_to<A>(self, definition: &mut Definition<A>) {
        match self {
            Self::Specific(addr) => definition.specifics.push(addr),
            Self::Range(range) if range.is_single() => definition.specifics.push(range.begin()),
            Self::Range(range) => definition.ranges.push(range),
        }
    }
}

impl From<Ipv4Addr> for MergeTarget {
    fn from(addr: Ipv4Addr) -> Self {
        Self::Specific(addr)
    }
}

impl From<AddressRange> for MergeTarget {
    fn from(range: AddressRange) -> Self {
        if range.is_single() {
            Self::Specific(range.begin())
        } else {
            Self::Range(range)
        }
    }
}

impl fmt::Display for MergeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Specific(addr) => write!(f, "{addr}"),
            Self::Range(range) => write!(f, "{range}"),
        }
    }
}

/// What a merge did to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The target joined an existing definition with equal attributes.
    Joined {
        /// Priority position of that definition after normalization.
        index: usize,
    },

    /// A new definition was inserted at index 0.
    Inserted {
        /// Set when an attribute-equal definition existed but was shadowed
        /// for the target by the definition at this index (pre-merge
        /// position).
        conflict: Option<usize>,
    },
}

/// Applies an override to `document` and renormalizes it.
///
/// Attribute equality is judged on the resolved form under the document's
/// current global defaults, so an override that spells out a value equal to
/// the global default matches a definition that leaves it unset.
pub fn merge<A: AttributeSet>(
    document: &mut PeerDocument<A>,
    target: MergeTarget,
    attributes: A,
) -> MergeOutcome {
    let span = target.span();
    let wanted = attributes.resolve(&document.defaults);
    let candidate = document
        .definitions
        .iter()
        .position(|definition| definition.attributes.resolve(&document.defaults) == wanted);

    let outcome = match candidate {
        Some(index) => match shadowing_definition(&document.definitions[..index], &span) {
            None => {
                target.add_to(&mut document.definitions[index]);
                let dropped_before = document.definitions[..index]
                    .iter()
                    .filter(|definition| definition.has_no_coverage())
                    .count();
                MergeOutcome::Joined {
                    index: index - dropped_before,
                }
            }
            Some(blocker) => {
                tracing::warn!(
                    protocol = A::PROTOCOL,
                    %target,
                    candidate = index,
                    blocker,
                    "Merge conflict: matching definition is shadowed, inserting a new definition"
                );
                insert_first(document, target, attributes);
                MergeOutcome::Inserted {
                    conflict: Some(blocker),
                }
            }
        },
        None => {
            insert_first(document, target, attributes);
            MergeOutcome::Inserted { conflict: None }
        }
    };

    let dropped = normalize_list(&mut document.definitions);
    tracing::debug!(
        protocol = A::PROTOCOL,
        %target,
        ?outcome,
        dropped,
        "Merged override into document"
    );
    outcome
}

fn shadowing_definition<A>(higher: &[Definition<A>], span: &AddressRange) -> Option<usize> {
    higher
        .iter()
        .position(|definition| definition.covers_any(span))
}

fn insert_first<A>(document: &mut PeerDocument<A>, target: MergeTarget, attributes: A) {
    let mut definition = Definition::new(attributes);
    target.add_to(&mut definition);
    document.definitions.insert(0, definition);
}
