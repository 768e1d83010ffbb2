//! Tests for coverage canonicalization.

use std::net::Ipv4Addr;

use super::*;
use crate::address::{AddressRange, IpPattern, to_key};
use crate::attributes::SnmpAttributes;

// ============================================================================
// Test Fixtures
// ============================================================================

fn addr(text: &str) -> Ipv4Addr {
    text.parse().unwrap()
}

/// Address in 10.0.0.0/24 with the given last octet.
fn host(last: u8) -> Ipv4Addr {
    Ipv4Addr::new(10, 0, 0, last)
}

fn span(begin: u8, end: u8) -> AddressRange {
    AddressRange::new(host(begin), host(end)).unwrap()
}

fn definition(specifics: &[u8], ranges: &[(u8, u8)]) -> Definition<SnmpAttributes> {
    Definition {
        specifics: specifics.iter().map(|&s| host(s)).collect(),
        ranges: ranges.iter().map(|&(b, e)| span(b, e)).collect(),
        patterns: Vec::new(),
        attributes: SnmpAttributes::default(),
    }
}

fn normalized(mut def: Definition<SnmpAttributes>) -> Definition<SnmpAttributes> {
    normalize(&mut def);
    def
}

fn assert_canonical(def: &Definition<SnmpAttributes>) {
    for pair in def.specifics.windows(2) {
        assert!(to_key(pair[0]) < to_key(pair[1]), "specifics not sorted: {pair:?}");
    }
    for pair in def.ranges.windows(2) {
        assert!(
            u64::from(to_key(pair[1].begin())) > u64::from(to_key(pair[0].end())) + 1,
            "ranges touch: {pair:?}"
        );
    }
    for specific in &def.specifics {
        for range in &def.ranges {
            let touching = AddressRange::single(*specific).touches(range);
            assert!(!touching, "specific {specific} touches range {range}");
        }
    }
    assert!(def.ranges.iter().all(|r| !r.is_single()), "degenerate range left");
}

// ============================================================================
// Scenarios
// ============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn non_adjacent_specifics_are_left_alone() {
        let def = normalized(definition(&[5, 7, 10], &[]));
        assert_eq!(def.specifics, vec![host(5), host(7), host(10)]);
        assert!(def.ranges.is_empty());
    }

    #[test]
    fn consecutive_specifics_become_a_range() {
        let def = normalized(definition(&[10, 11, 12], &[]));
        assert!(def.specifics.is_empty());
        assert_eq!(def.ranges, vec![span(10, 12)]);
    }

    #[test]
    fn specific_below_range_extends_begin() {
        let def = normalized(definition(&[9], &[(10, 11)]));
        assert!(def.specifics.is_empty());
        assert_eq!(def.ranges, vec![span(9, 11)]);
    }

    #[test]
    fn specific_above_range_extends_end() {
        let def = normalized(definition(&[12], &[(10, 11)]));
        assert!(def.specifics.is_empty());
        assert_eq!(def.ranges, vec![span(10, 12)]);
    }

    #[test]
    fn specific_inside_range_is_dropped() {
        let def = normalized(definition(&[15], &[(10, 20)]));
        assert!(def.specifics.is_empty());
        assert_eq!(def.ranges, vec![span(10, 20)]);
    }

    #[test]
    fn splice_keeps_non_adjacent_specific() {
        let def = normalized(definition(&[7], &[(11, 20)]));
        assert_eq!(def.specifics, vec![host(7)]);
        assert_eq!(def.ranges, vec![span(11, 20)]);
    }
}

mod passes {
    use super::*;

    #[test]
    fn degenerate_range_becomes_specific() {
        let def = normalized(definition(&[], &[(4, 4)]));
        assert_eq!(def.specifics, vec![host(4)]);
        assert!(def.ranges.is_empty());
    }

    #[test]
    fn degenerate_range_joins_adjacent_specific() {
        let def = normalized(definition(&[5], &[(4, 4)]));
        assert!(def.specifics.is_empty());
        assert_eq!(def.ranges, vec![span(4, 5)]);
    }

    #[test]
    fn duplicate_specifics_are_collapsed() {
        let def = normalized(definition(&[3, 3, 3], &[]));
        assert_eq!(def.specifics, vec![host(3)]);
    }

    #[test]
    fn specifics_are_sorted() {
        let def = normalized(definition(&[200, 3, 90], &[]));
        assert_eq!(def.specifics, vec![host(3), host(90), host(200)]);
    }

    #[test]
    fn overlapping_ranges_merge() {
        let def = normalized(definition(&[], &[(30, 40), (10, 35)]));
        assert_eq!(def.ranges, vec![span(10, 40)]);
    }

    #[test]
    fn adjacent_ranges_merge() {
        let def = normalized(definition(&[], &[(21, 30), (10, 20)]));
        assert_eq!(def.ranges, vec![span(10, 30)]);
    }

    #[test]
    fn contained_range_is_absorbed() {
        let def = normalized(definition(&[], &[(10, 50), (20, 30)]));
        assert_eq!(def.ranges, vec![span(10, 50)]);
    }

    #[test]
    fn separated_ranges_stay_apart() {
        let def = normalized(definition(&[], &[(30, 40), (10, 20)]));
        assert_eq!(def.ranges, vec![span(10, 20), span(30, 40)]);
    }

    #[test]
    fn specific_bridging_two_ranges_joins_them() {
        let def = normalized(definition(&[21], &[(10, 20), (22, 30)]));
        assert!(def.specifics.is_empty());
        assert_eq!(def.ranges, vec![span(10, 30)]);
    }

    #[test]
    fn run_adjacent_to_range_merges_into_it() {
        let def = normalized(definition(&[21, 22, 23], &[(10, 20)]));
        assert!(def.specifics.is_empty());
        assert_eq!(def.ranges, vec![span(10, 23)]);
    }

    #[test]
    fn ranges_crossing_octet_boundary_merge() {
        let mut def = definition(&[], &[]);
        def.ranges = vec![
            AddressRange::new(addr("10.0.0.200"), addr("10.0.0.255")).unwrap(),
            AddressRange::new(addr("10.0.1.0"), addr("10.0.1.20")).unwrap(),
        ];
        let def = normalized(def);
        assert_eq!(
            def.ranges,
            vec![AddressRange::new(addr("10.0.0.200"), addr("10.0.1.20")).unwrap()]
        );
    }

    #[test]
    fn extremes_of_address_space_do_not_overflow() {
        let mut def = definition(&[], &[]);
        def.specifics = vec![Ipv4Addr::UNSPECIFIED, Ipv4Addr::BROADCAST];
        def.ranges = vec![
            AddressRange::new(addr("0.0.0.1"), addr("0.0.0.9")).unwrap(),
            AddressRange::new(addr("255.255.255.0"), addr("255.255.255.254")).unwrap(),
        ];
        let def = normalized(def);
        assert!(def.specifics.is_empty());
        assert_eq!(
            def.ranges,
            vec![
                AddressRange::new(addr("0.0.0.0"), addr("0.0.0.9")).unwrap(),
                AddressRange::new(addr("255.255.255.0"), addr("255.255.255.255")).unwrap(),
            ]
        );
    }

    #[test]
    fn patterns_pass_through_unchanged() {
        let pattern: IpPattern = "10.0.0.*".parse().unwrap();
        let def = normalized(definition(&[1], &[]).with_pattern(pattern.clone()));
        assert_eq!(def.patterns, vec![pattern]);
        assert_eq!(def.specifics, vec![host(1)]);
    }
}

// ============================================================================
// Properties over a deterministic family of inputs
// ============================================================================

mod properties {
    use super::*;

    /// Small deterministic generator (xorshift) so the inputs are reproducible.
    struct Inputs(u32);

    impl Inputs {
        fn next(&mut self) -> u32 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 17;
            self.0 ^= self.0 << 5;
            self.0
        }

        fn octet(&mut self) -> u8 {
            u8::try_from(self.next() % 48).unwrap()
        }

        fn definition(&mut self) -> Definition<SnmpAttributes> {
            let specifics: Vec<u8> = (0..self.next() % 12).map(|_| self.octet()).collect();
            let ranges: Vec<(u8, u8)> = (0..self.next() % 5)
                .map(|_| {
                    let a = self.octet();
                    let b = self.octet();
                    (a.min(b), a.max(b))
                })
                .collect();
            definition(&specifics, &ranges)
        }
    }

    fn samples() -> Vec<Definition<SnmpAttributes>> {
        let mut inputs = Inputs(0x9E37_79B9);
        (0..300).map(|_| inputs.definition()).collect()
    }

    #[test]
    fn normalize_is_idempotent() {
        for def in samples() {
            let once = normalized(def);
            let twice = normalized(once.clone());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn normalize_preserves_coverage() {
        for def in samples() {
            let after = normalized(def.clone());
            for last in 0..=50u8 {
                assert_eq!(
                    def.covers(host(last)),
                    after.covers(host(last)),
                    "coverage of {} changed for {def:?}",
                    host(last)
                );
            }
        }
    }

    #[test]
    fn normalize_produces_canonical_form() {
        for def in samples() {
            assert_canonical(&normalized(def));
        }
    }

    #[test]
    fn normalize_ignores_input_order() {
        for def in samples() {
            let mut reversed = def.clone();
            reversed.specifics.reverse();
            reversed.ranges.reverse();
            assert_eq!(normalized(def), normalized(reversed));
        }
    }
}

mod normalize_list {
    use super::*;

    #[test]
    fn drops_definitions_without_coverage() {
        let mut list = vec![
            definition(&[], &[]),
            definition(&[1, 2], &[]),
            definition(&[], &[]),
        ];

        let dropped = normalize_list(&mut list);

        assert_eq!(dropped, 2);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].ranges, vec![span(1, 2)]);
    }

    #[test]
    fn keeps_pattern_only_definitions() {
        let pattern: IpPattern = "10.*.*.*".parse().unwrap();
        let mut list = vec![definition(&[], &[]).with_pattern(pattern)];

        assert_eq!(normalize_list(&mut list), 0);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn preserves_relative_order() {
        let mut first = definition(&[9], &[]);
        first.attributes.retries = Some(1);
        let mut second = definition(&[1], &[]);
        second.attributes.retries = Some(2);
        let mut list = vec![first, definition(&[], &[]), second];

        normalize_list(&mut list);

        assert_eq!(list[0].attributes.retries, Some(1));
        assert_eq!(list[1].attributes.retries, Some(2));
    }
}
