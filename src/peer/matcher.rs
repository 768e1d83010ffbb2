//! First-match resolution of an address against a document.
//!
//! Definitions are scanned in priority order. Within one definition the
//! membership tests run specific → range → pattern, and the scan stops at
//! the first positive test anywhere in the document. This is a fixed
//! tie-break: a specific in a lower-priority definition never beats a range
//! or pattern in a higher-priority one.

use std::net::Ipv4Addr;

use crate::attributes::AttributeSet;

use super::{Definition, PeerDocument};

/// Which kind of coverage produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// Listed as a specific address.
    Specific,
    /// Inside one of the definition's ranges.
    Range,
    /// Matched one of the definition's wildcard patterns.
    Pattern,
}

/// A matched definition and how it matched.
#[derive(Debug, Clone, Copy)]
pub struct Match<'a, A> {
    /// Priority position of the definition.
    pub index: usize,
    /// The first positive membership test.
    pub kind: MatchKind,
    /// The matched definition.
    pub definition: &'a Definition<A>,
}

/// Finds the highest-priority definition covering `addr`.
#[must_use]
pub fn find_match<A>(addr: Ipv4Addr, definitions: &[Definition<A>]) -> Option<Match<'_, A>> {
    definitions.iter().enumerate().find_map(|(index, definition)| {
        definition.match_kind(addr).map(|kind| Match {
            index,
            kind,
            definition,
        })
    })
}

/// Resolves the connection attributes for `addr`.
///
/// Never fails: an unmatched address resolves from the global defaults and
/// the compiled-in constants alone.
#[must_use]
pub fn resolve<A: AttributeSet>(addr: Ipv4Addr, document: &PeerDocument<A>) -> A::Resolved {
    match find_match(addr, &document.definitions) {
        Some(found) => {
            tracing::trace!(
                protocol = A::PROTOCOL,
                %addr,
                index = found.index,
                kind = ?found.kind,
                "Matched definition"
            );
            found.definition.attributes.resolve(&document.defaults)
        }
        None => {
            tracing::trace!(protocol = A::PROTOCOL, %addr, "No definition matched, using defaults");
            A::default().resolve(&document.defaults)
        }
    }
}
