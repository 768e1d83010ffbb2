//! Octet-wise wildcard address patterns.
//!
//! A pattern has four dot-separated octet expressions. Each expression is
//! `*`, a decimal value, an inclusive `low-high` span, or a comma-separated
//! list of those. `10.1.*.1-20` or `192.168.0,2.5,7,9` are typical.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{AddressRange, to_key};

/// Error type for pattern parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The pattern does not have exactly four octet expressions.
    #[error("Invalid address pattern '{pattern}': expected 4 octets, found {found}")]
    OctetCount {
        /// The rejected pattern
        pattern: String,
        /// Number of octet expressions found
        found: usize,
    },

    /// An octet expression could not be parsed.
    #[error("Invalid address pattern '{pattern}': bad octet expression '{octet}'")]
    Octet {
        /// The rejected pattern
        pattern: String,
        /// The offending octet expression
        octet: String,
    },
}

/// The set of values one octet may take, as a 256-bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OctetSet([u128; 2]);

impl OctetSet {
    const EMPTY: Self = Self([0; 2]);
    const ANY: Self = Self([u128::MAX; 2]);

    const fn contains(self, value: u8) -> bool {
        let value = value as usize;
        self.0[value / 128] & (1 << (value % 128)) != 0
    }

    fn insert_span(&mut self, low: u8, high: u8) {
        for value in low..=high {
            let value = usize::from(value);
            self.0[value / 128] |= 1 << (value % 128);
        }
    }

    fn parse(expr: &str) -> Option<Self> {
        let mut set = Self::EMPTY;
        for item in expr.split(',') {
            let item = item.trim();
            if item == "*" {
                return Some(Self::ANY);
            }
            let (low, high) = match item.split_once('-') {
                Some((low, high)) => (low.trim().parse().ok()?, high.trim().parse().ok()?),
                None => {
                    let value = item.parse().ok()?;
                    (value, value)
                }
            };
            if low > high {
                return None;
            }
            set.insert_span(low, high);
        }
        Some(set)
    }
}

/// A wildcard pattern over the dotted-decimal form of an address.
///
/// Patterns keep their source text so they serialize back unchanged.
///
/// # Examples
///
/// ```
/// use peerconf::address::IpPattern;
///
/// let pattern: IpPattern = "10.1.*.1-20".parse().unwrap();
/// assert!(pattern.matches("10.1.77.12".parse().unwrap()));
/// assert!(!pattern.matches("10.1.77.21".parse().unwrap()));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IpPattern {
    source: String,
    octets: [OctetSet; 4],
}

impl IpPattern {
    /// Parses a pattern.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the text is not a valid pattern.
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        let source = text.trim();
        let exprs: Vec<&str> = source.split('.').collect();
        if exprs.len() != 4 {
            return Err(PatternError::OctetCount {
                pattern: source.to_string(),
                found: exprs.len(),
            });
        }

        let mut octets = [OctetSet::EMPTY; 4];
        for (slot, expr) in octets.iter_mut().zip(&exprs) {
            *slot = OctetSet::parse(expr).ok_or_else(|| PatternError::Octet {
                pattern: source.to_string(),
                octet: (*expr).to_string(),
            })?;
        }

        Ok(Self {
            source: source.to_string(),
            octets,
        })
    }

    /// The pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if the address matches the pattern.
    #[must_use]
    pub fn matches(&self, addr: Ipv4Addr) -> bool {
        self.octets
            .iter()
            .zip(addr.octets())
            .all(|(set, octet)| set.contains(octet))
    }

    /// Returns the lowest matching address that is not below `from`.
    #[must_use]
    pub fn next_match(&self, from: Ipv4Addr) -> Option<Ipv4Addr> {
        self.search(0, true, 0, from.octets()).map(Ipv4Addr::from)
    }

    /// Returns true if any address of `range` matches the pattern.
    #[must_use]
    pub fn intersects(&self, range: &AddressRange) -> bool {
        self.next_match(range.begin())
            .is_some_and(|found| to_key(found) <= range.end_key())
    }

    // Depth-first over octet positions. While `tight`, the prefix equals the
    // prefix of `from` and the current octet may not go below `from`'s.
    fn search(&self, position: usize, tight: bool, prefix: u32, from: [u8; 4]) -> Option<u32> {
        let low = if tight { from[position] } else { 0 };
        for value in low..=u8::MAX {
            if !self.octets[position].contains(value) {
                continue;
            }
            let key = (prefix << 8) | u32::from(value);
            if position == 3 {
                return Some(key);
            }
            let still_tight = tight && value == from[position];
            if let Some(found) = self.search(position + 1, still_tight, key, from) {
                return Some(found);
            }
        }
        None
    }
}

impl PartialEq for IpPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for IpPattern {}

impl fmt::Display for IpPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for IpPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for IpPattern {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IpPattern> for String {
    fn from(pattern: IpPattern) -> Self {
        pattern.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(text: &str) -> IpPattern {
        text.parse().unwrap()
    }

    fn addr(text: &str) -> Ipv4Addr {
        text.parse().unwrap()
    }

    mod parsing {
        use super::*;

        #[test]
        fn accepts_wildcards_lists_and_spans() {
            let p = pattern("10.*.1,3,5-7.*");
            assert_eq!(p.as_str(), "10.*.1,3,5-7.*");
        }

        #[test]
        fn rejects_wrong_octet_count() {
            let err = IpPattern::parse("10.1.1").unwrap_err();
            assert!(matches!(err, PatternError::OctetCount { found: 3, .. }));
        }

        #[test]
        fn rejects_out_of_range_octet() {
            let err = IpPattern::parse("10.1.1.256").unwrap_err();
            assert!(matches!(err, PatternError::Octet { ref octet, .. } if octet == "256"));
        }

        #[test]
        fn rejects_reversed_span() {
            assert!(IpPattern::parse("10.1.1.9-3").is_err());
        }

        #[test]
        fn rejects_empty_octet() {
            assert!(IpPattern::parse("10..1.1").is_err());
        }

        #[test]
        fn trims_surrounding_whitespace() {
            assert_eq!(pattern("  10.*.*.*  ").as_str(), "10.*.*.*");
        }
    }

    mod matching {
        use super::*;

        #[test]
        fn wildcard_matches_any_octet() {
            let p = pattern("192.168.*.*");
            assert!(p.matches(addr("192.168.0.0")));
            assert!(p.matches(addr("192.168.255.255")));
            assert!(!p.matches(addr("192.169.0.1")));
        }

        #[test]
        fn list_and_span_members_match() {
            let p = pattern("10.0.0.1,5-7");
            assert!(p.matches(addr("10.0.0.1")));
            assert!(p.matches(addr("10.0.0.6")));
            assert!(!p.matches(addr("10.0.0.4")));
            assert!(!p.matches(addr("10.0.0.8")));
        }

        #[test]
        fn star_inside_list_matches_everything() {
            let p = pattern("10.0.0.3,*");
            assert!(p.matches(addr("10.0.0.200")));
        }
    }

    mod next_match {
        use super::*;

        #[test]
        fn returns_from_when_it_matches() {
            let p = pattern("10.*.*.*");
            assert_eq!(p.next_match(addr("10.2.3.4")), Some(addr("10.2.3.4")));
        }

        #[test]
        fn carries_into_higher_octets() {
            let p = pattern("10.*.*.5");
            assert_eq!(p.next_match(addr("10.0.0.6")), Some(addr("10.0.1.5")));
        }

        #[test]
        fn none_when_exhausted() {
            let p = pattern("10.0.0.5");
            assert_eq!(p.next_match(addr("10.0.0.6")), None);
        }

        #[test]
        fn intersects_detects_overlap_inside_range() {
            let p = pattern("10.0.*.50");
            let hit = AddressRange::new(addr("10.0.3.40"), addr("10.0.3.60")).unwrap();
            let miss = AddressRange::new(addr("10.0.3.51"), addr("10.0.4.49")).unwrap();
            assert!(p.intersects(&hit));
            assert!(!p.intersects(&miss));
        }
    }

    #[test]
    fn serde_preserves_source_text() {
        let p = pattern("172.16-31.*.*");
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"172.16-31.*.*\"");
        let back: IpPattern = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
