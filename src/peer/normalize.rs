//! Canonicalization of a definition's address coverage.
//!
//! Normalizing never changes which addresses a definition covers, only how
//! the coverage is written down. The passes, in order:
//!
//! 1. Degenerate ranges (`begin == end`) become specifics.
//! 2. Specifics are sorted and deduplicated; each maximal run of consecutive
//!    addresses (length >= 2) becomes a range.
//! 3. Remaining specifics inside a range are dropped; those one below a
//!    range's begin or one above its end extend that range.
//! 4. Ranges are sorted by begin, and overlapping or adjacent ranges merge.
//!
//! Patterns pass through untouched.

use std::net::Ipv4Addr;

use crate::address::{AddressRange, from_key, to_key};

use super::Definition;

/// Canonicalizes the specifics and ranges of one definition in place.
///
/// Idempotent: normalizing a normalized definition changes nothing.
pub fn normalize<A>(definition: &mut Definition<A>) {
    let (specifics, ranges) = canonical_coverage(&definition.specifics, &definition.ranges);
    definition.specifics = specifics;
    definition.ranges = ranges;
}

/// Canonicalizes every definition and drops those with no coverage left.
///
/// Returns the number of definitions dropped. Relative order of the
/// surviving definitions is preserved.
pub fn normalize_list<A>(definitions: &mut Vec<Definition<A>>) -> usize {
    let before = definitions.len();
    definitions.retain(|definition| {
        let empty = definition.has_no_coverage();
        if empty {
            tracing::debug!("Removing definition with no address coverage");
        }
        !empty
    });
    for definition in definitions.iter_mut() {
        normalize(definition);
    }
    before - definitions.len()
}

/// Inclusive span of ordering keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    begin: u32,
    end: u32,
}

fn canonical_coverage(
    specifics: &[Ipv4Addr],
    ranges: &[AddressRange],
) -> (Vec<Ipv4Addr>, Vec<AddressRange>) {
    let mut singles: Vec<u32> = specifics.iter().map(|addr| to_key(*addr)).collect();
    let mut spans = Vec::with_capacity(ranges.len());

    // Pass 1
    for range in ranges {
        if range.is_single() {
            singles.push(range.begin_key());
        } else {
            spans.push(Span {
                begin: range.begin_key(),
                end: range.end_key(),
            });
        }
    }

    // Pass 2
    singles.sort_unstable();
    singles.dedup();
    let mut singles = collapse_runs(&singles, &mut spans);

    // Pass 3, repeated until no specific is absorbed
    while absorb_singles(&mut singles, &mut spans) {}

    // Pass 4
    let spans = merge_spans(spans);

    (
        singles.into_iter().map(from_key).collect(),
        spans
            .into_iter()
            .map(|span| AddressRange::from_keys(span.begin, span.end))
            .collect(),
    )
}

/// Moves every run of consecutive keys into `spans`; returns the leftovers.
fn collapse_runs(sorted: &[u32], spans: &mut Vec<Span>) -> Vec<u32> {
    let mut leftovers = Vec::new();
    let mut index = 0;
    while index < sorted.len() {
        let first = sorted[index];
        let mut last = first;
        while index + 1 < sorted.len() && sorted[index + 1] == last.wrapping_add(1) {
            index += 1;
            last = sorted[index];
        }
        if last == first {
            leftovers.push(first);
        } else {
            spans.push(Span { begin: first, end: last });
        }
        index += 1;
    }
    leftovers
}

/// One absorption pass. Returns true if any single was consumed.
fn absorb_singles(singles: &mut Vec<u32>, spans: &mut [Span]) -> bool {
    let before = singles.len();
    singles.retain(|&single| {
        for span in spans.iter_mut() {
            if span.begin <= single && single <= span.end {
                return false;
            }
            if span.begin.checked_sub(1) == Some(single) {
                span.begin = single;
                return false;
            }
            if span.end.checked_add(1) == Some(single) {
                span.end = single;
                return false;
            }
        }
        true
    });
    singles.len() != before
}

fn merge_spans(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort_unstable_by_key(|span| (span.begin, span.end));
    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(prior) if span.begin <= prior.end.saturating_add(1) => {
                prior.begin = prior.begin.min(span.begin);
                prior.end = prior.end.max(span.end);
            }
            _ => merged.push(span),
        }
    }
    merged
}
