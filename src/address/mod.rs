//! IPv4 address ordering and inclusive address ranges.
//!
//! Every ordering, adjacency, and membership test in this crate works on the
//! `u32` key of an address rather than on its dotted-decimal text.

pub mod pattern;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use pattern::{IpPattern, PatternError};

/// Error type for address parsing and range construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The text is not a dotted-decimal IPv4 address.
    #[error("Invalid IPv4 address '{0}'")]
    Invalid(String),

    /// The range begins after it ends.
    #[error("Invalid range {begin} - {end}: begin is greater than end")]
    Reversed {
        /// First address of the rejected range
        begin: Ipv4Addr,
        /// Last address of the rejected range
        end: Ipv4Addr,
    },
}

/// Returns the totally-ordered key of an address.
#[must_use]
pub const fn to_key(addr: Ipv4Addr) -> u32 {
    addr.to_bits()
}

/// Returns the address for an ordering key.
#[must_use]
pub const fn from_key(key: u32) -> Ipv4Addr {
    Ipv4Addr::from_bits(key)
}

/// Parses a dotted-decimal address, ignoring surrounding whitespace.
///
/// # Errors
///
/// Returns [`AddressError::Invalid`] if the trimmed text is not an IPv4 address.
pub fn parse_address(text: &str) -> Result<Ipv4Addr, AddressError> {
    text.trim()
        .parse()
        .map_err(|_| AddressError::Invalid(text.to_string()))
}

/// Returns true if the two addresses differ by exactly one.
#[must_use]
pub const fn is_adjacent(a: Ipv4Addr, b: Ipv4Addr) -> bool {
    to_key(a).abs_diff(to_key(b)) == 1
}

/// An inclusive, contiguous interval of addresses.
///
/// Construction guarantees `begin <= end`. A range where both ends are equal
/// is legal here; the normalizer turns it into a specific address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange", into = "RawRange")]
pub struct AddressRange {
    begin: Ipv4Addr,
    end: Ipv4Addr,
}

impl AddressRange {
    /// Creates a range from its inclusive bounds.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::Reversed`] if `begin` is greater than `end`.
    pub fn new(begin: Ipv4Addr, end: Ipv4Addr) -> Result<Self, AddressError> {
        if to_key(begin) > to_key(end) {
            return Err(AddressError::Reversed { begin, end });
        }
        Ok(Self { begin, end })
    }

    /// Creates a range covering exactly one address.
    #[must_use]
    pub const fn single(addr: Ipv4Addr) -> Self {
        Self {
            begin: addr,
            end: addr,
        }
    }

    /// Creates a range from ordering keys. Callers must pass `begin <= end`.
    pub(crate) const fn from_keys(begin: u32, end: u32) -> Self {
        debug_assert!(begin <= end);
        Self {
            begin: from_key(begin),
            end: from_key(end),
        }
    }

    /// First address in the range.
    #[must_use]
    pub const fn begin(&self) -> Ipv4Addr {
        self.begin
    }

    /// Last address in the range.
    #[must_use]
    pub const fn end(&self) -> Ipv4Addr {
        self.end
    }

    pub(crate) const fn begin_key(&self) -> u32 {
        to_key(self.begin)
    }

    pub(crate) const fn end_key(&self) -> u32 {
        to_key(self.end)
    }

    /// Returns true if the range covers a single address.
    #[must_use]
    pub const fn is_single(&self) -> bool {
        self.begin_key() == self.end_key()
    }

    /// Number of addresses covered.
    #[must_use]
    pub const fn len(&self) -> u64 {
        (self.end_key() - self.begin_key()) as u64 + 1
    }

    /// Returns true if `addr` lies within the range.
    #[must_use]
    pub const fn contains(&self, addr: Ipv4Addr) -> bool {
        let key = to_key(addr);
        self.begin_key() <= key && key <= self.end_key()
    }

    /// Returns true if the two ranges share at least one address.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.begin_key() <= other.end_key() && other.begin_key() <= self.end_key()
    }

    /// Returns true if the ranges overlap or touch, i.e. their union is contiguous.
    #[must_use]
    pub const fn touches(&self, other: &Self) -> bool {
        let (first, second) = if self.begin_key() <= other.begin_key() {
            (self, other)
        } else {
            (other, self)
        };
        second.begin_key() <= first.end_key().saturating_add(1)
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.begin)
        } else {
            write!(f, "{}-{}", self.begin, self.end)
        }
    }
}

/// Wire form of a single persisted address.
///
/// Read through [`parse_address`], so hand-edited documents may pad
/// addresses with whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub(crate) struct AddressText(pub(crate) Ipv4Addr);

impl TryFrom<String> for AddressText {
    type Error = AddressError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        parse_address(&text).map(Self)
    }
}

impl From<AddressText> for String {
    fn from(addr: AddressText) -> Self {
        addr.0.to_string()
    }
}

/// Wire form of a range; validated on the way in.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRange {
    begin: AddressText,
    end: AddressText,
}

impl TryFrom<RawRange> for AddressRange {
    type Error = AddressError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.begin.0, raw.end.0)
    }
}

impl From<AddressRange> for RawRange {
    fn from(range: AddressRange) -> Self {
        Self {
            begin: AddressText(range.begin),
            end: AddressText(range.end),
        }
    }
}
