//! Tests for `Name=Value` assignment parsing.

use crate::config::parse_assignments;

use super::*;

#[test]
fn parses_and_trims_pairs() {
    let params = parse_assignments(&["communityString = lan", "port=1161"]).unwrap();

    assert_eq!(params.get("communityString"), Some("lan"));
    assert_eq!(params.get("port"), Some("1161"));
}

#[test]
fn value_may_contain_equals() {
    let params = parse_assignments(&["password=a=b"]).unwrap();
    assert_eq!(params.get("password"), Some("a=b"));
}

#[test]
fn later_assignment_wins() {
    let params = parse_assignments(&["port=1", "port=2"]).unwrap();
    assert_eq!(params.get("port"), Some("2"));
}

#[test]
fn empty_list_is_empty() {
    let params = parse_assignments::<&str>(&[]).unwrap();
    assert!(params.is_empty());
}

#[test]
fn missing_equals_is_rejected() {
    let err = parse_assignments(&["communityString"]).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidAssignment { ref value } if value == "communityString"));
}

#[test]
fn empty_name_is_rejected() {
    assert!(parse_assignments(&["=lan"]).is_err());
}
