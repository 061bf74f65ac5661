//! Tests for field path parsing and serialization.
use flowmap::path::{self, FieldPath, Segment};
use flowmap::prelude::*;
use pretty_assertions::assert_eq;

fn name(s: &str) -> Segment {
    Segment::Name(s.to_string())
}

fn key(s: &str) -> Segment {
    Segment::Key(s.to_string())
}

#[test]
fn test_dotted_names() {
    let parsed = path::parse("customer.address.city").unwrap();
    assert_eq!(
        parsed.segments(),
        &[name("customer"), name("address"), name("city")]
    );
}

#[test]
fn test_indices_and_quoted_keys() {
    let parsed = path::parse(r#"items[0]["first name"].tags['x.y'][12]"#).unwrap();
    assert_eq!(
        parsed.segments(),
        &[
            name("items"),
            Segment::Index(0),
            key("first name"),
            name("tags"),
            key("x.y"),
            Segment::Index(12),
        ]
    );
}

#[test]
fn test_leading_dot_is_ignored() {
    assert_eq!(path::parse(".a.b").unwrap(), path::parse("a.b").unwrap());
}

#[test]
fn test_empty_path() {
    assert!(path::parse("").unwrap().is_empty());
}

#[test]
fn test_leading_bracket() {
    let parsed = path::parse("[2].name").unwrap();
    assert_eq!(parsed.segments(), &[Segment::Index(2), name("name")]);
}

#[test]
fn test_quote_only_closes_before_bracket() {
    let parsed = path::parse(r#"["say "hi" now"]"#).unwrap();
    assert_eq!(parsed.segments(), &[key(r#"say "hi" now"#)]);
}

#[test]
fn test_non_integer_index_is_error() {
    let err = path::parse("items[abc]").unwrap_err();
    assert!(matches!(err, ParseError::InvalidPath { .. }));
    assert!(err.to_string().contains("invalid array index"));
}

#[test]
fn test_unterminated_bracket_is_error() {
    assert!(path::parse("items[0").is_err());
    assert!(path::parse(r#"items["name]"#).is_err());
}

#[test]
fn test_mismatched_quote_is_error() {
    assert!(path::parse(r#"items["name']"#).is_err());
}

#[test]
fn test_empty_name_is_error() {
    assert!(path::parse("a..b").is_err());
    assert!(path::parse("a.").is_err());
    assert!(path::parse("a[0]b").is_err());
}

#[test]
fn test_round_trip_through_display() {
    let inputs = [
        "a",
        "a.b.c",
        "items[3].name",
        r#"a["b c"].d"#,
        r#"a['say "hi"']"#,
        r#"a["x']"y"]"#,
        r#"a['ends with "]']"#,
        "[0][1]",
    ];
    for input in inputs {
        let parsed = path::parse(input).unwrap();
        let reparsed = path::parse(&parsed.to_string()).unwrap();
        assert_eq!(parsed, reparsed, "round trip of '{}'", input);
    }
}

#[test]
fn test_display_picks_quote_that_keeps_key_intact() {
    let path = FieldPath::new(vec![key(r#"x']"y"#)]);
    assert_eq!(path.to_string(), r#"["x']"y"]"#);
    let path = FieldPath::new(vec![key(r#"say "hi"]"#)]);
    assert_eq!(path.to_string(), r#"['say "hi"]']"#);
}

#[test]
fn test_display_is_canonical() {
    let path = FieldPath::new(vec![name("a"), Segment::Index(0), key("b c"), name("d")]);
    assert_eq!(path.to_string(), r#"a[0]["b c"].d"#);
}

#[test]
fn test_strip_input_prefix() {
    assert_eq!(path::strip_input_prefix("$INPUT.items[0]"), "items[0]");
    assert_eq!(path::strip_input_prefix("$INPUT['items']"), "['items']");
    assert_eq!(path::strip_input_prefix("items"), "items");
}
