//! Tests for reading and writing nested values by path.
use flowmap::path;
use flowmap::prelude::*;
use flowmap::tree;
use pretty_assertions::assert_eq;
use serde_json::json;

fn value(data: serde_json::Value) -> Value {
    Value::from(data)
}

fn segments(text: &str) -> Vec<Segment> {
    path::parse(text).unwrap().segments().to_vec()
}

#[test]
fn test_get_nested_field() {
    let tree = value(json!({ "a": { "b": [ { "c": 7 } ] } }));
    let found = tree::get(&tree, &segments("a.b[0].c")).unwrap();
    assert_eq!(found, Some(Value::Integer(7)));
}

#[test]
fn test_get_missing_is_none() {
    let tree = value(json!({ "a": { "b": [1, 2] } }));
    assert_eq!(tree::get(&tree, &segments("a.x")).unwrap(), None);
    assert_eq!(tree::get(&tree, &segments("a.b[5]")).unwrap(), None);
    assert_eq!(tree::get(&tree, &segments("a.b.c")).unwrap(), None);
}

#[test]
fn test_get_empty_path_returns_tree() {
    let tree = value(json!({ "a": 1 }));
    assert_eq!(tree::get(&tree, &[]).unwrap(), Some(tree.clone()));
}

#[test]
fn test_get_parses_json_text() {
    let tree = Value::String(r#"{"user": {"name": "Ada"}}"#.to_string());
    let found = tree::get(&tree, &segments("user.name")).unwrap();
    assert_eq!(found, Some(Value::from("Ada")));
}

#[test]
fn test_get_text_that_only_looks_like_json() {
    let tree = Value::from("[INFO] started");
    assert_eq!(tree::get(&tree, &[]).unwrap(), Some(tree.clone()));

    let err = tree::get(&tree, &segments("[0]")).unwrap_err();
    assert!(matches!(
        err,
        MappingError::Coercion(CoercionError::NotAddressable { .. })
    ));
}

#[test]
fn test_set_replaces_text_that_only_looks_like_json() {
    let tree = value(json!({ "msg": "{not json" }));
    let updated = tree::set(&tree, &segments("msg"), Value::from("ok")).unwrap();
    assert_eq!(updated, value(json!({ "msg": "ok" })));

    let err = tree::set(&tree, &segments("msg.level"), Value::from("x")).unwrap_err();
    assert!(matches!(
        err,
        MappingError::Coercion(CoercionError::NotAddressable { .. })
    ));
}

#[test]
fn test_set_far_past_the_end_is_error() {
    let tree = value(json!({ "items": [] }));
    let err = tree::set(&tree, &segments("items[100000000000].x"), Value::from(1)).unwrap_err();
    assert!(matches!(
        err,
        MappingError::Coercion(CoercionError::OutOfRange { .. })
    ));
    assert!(tree::set(&tree, &segments("items[1000].x"), Value::from(1)).is_ok());
}

#[test]
fn test_get_into_plain_string_is_error() {
    let tree = Value::from("not json");
    let err = tree::get(&tree, &segments("name")).unwrap_err();
    assert!(matches!(
        err,
        MappingError::Coercion(CoercionError::NotAddressable { .. })
    ));
}

#[test]
fn test_set_then_get_returns_value() {
    let tree = value(json!({ "keep": true }));
    for text in ["a", "a.b.c", "list[2].name", r#"m["odd key"][0]"#] {
        let path = segments(text);
        let updated = tree::set(&tree, &path, Value::from("v")).unwrap();
        assert_eq!(
            tree::get(&updated, &path).unwrap(),
            Some(Value::from("v")),
            "path '{}'",
            text
        );
        assert_eq!(
            tree::get(&updated, &segments("keep")).unwrap(),
            Some(Value::Boolean(true))
        );
    }
}

#[test]
fn test_set_does_not_modify_input() {
    let tree = value(json!({ "a": { "b": 1 } }));
    let before = tree.clone();
    let updated = tree::set(&tree, &segments("a.b"), Value::Integer(2)).unwrap();
    assert_eq!(tree, before);
    assert_eq!(updated, value(json!({ "a": { "b": 2 } })));
}

#[test]
fn test_set_past_end_pads_with_empty_objects() {
    let updated = tree::set(&Value::Null, &segments("[3].name"), Value::from("x")).unwrap();
    assert_eq!(
        updated,
        value(json!([ {}, {}, {}, { "name": "x" } ]))
    );
}

#[test]
fn test_set_keeps_existing_indices_stable() {
    let tree = value(json!([ { "id": 0 }, { "id": 1 } ]));
    let updated = tree::set(&tree, &segments("[4].id"), Value::Integer(4)).unwrap();
    let Value::Array(items) = &updated else {
        panic!("expected array, got {:?}", updated);
    };
    assert_eq!(items.len(), 5);
    assert_eq!(items[0], value(json!({ "id": 0 })));
    assert_eq!(items[1], value(json!({ "id": 1 })));
    assert_eq!(items[4], value(json!({ "id": 4 })));
}

#[test]
fn test_set_creates_intermediate_containers() {
    let updated = tree::set(&Value::Null, &segments("a.list[1].b"), Value::Integer(1)).unwrap();
    assert_eq!(updated, value(json!({ "a": { "list": [ {}, { "b": 1 } ] } })));
}

#[test]
fn test_set_into_scalar_is_error() {
    let tree = value(json!({ "a": 5 }));
    assert!(tree::set(&tree, &segments("a.b"), Value::Integer(1)).is_err());
    assert!(tree::set(&tree, &segments("a[0]"), Value::Integer(1)).is_err());
}

#[test]
fn test_set_on_json_text_parses_it() {
    let tree = Value::from(r#"{"a": 1}"#);
    let updated = tree::set(&tree, &segments("b"), Value::Integer(2)).unwrap();
    assert_eq!(updated, value(json!({ "a": 1, "b": 2 })));
}

#[test]
fn test_complex_object_keeps_metadata() {
    let tree = Value::Complex(ComplexObject::new("schema-1", Value::Null));
    assert_eq!(
        tree::get(&tree, &[]).unwrap(),
        Some(tree.clone())
    );
    let updated = tree::set(&tree, &segments("name"), Value::from("x")).unwrap();
    let Value::Complex(complex) = &updated else {
        panic!("expected complex object, got {:?}", updated);
    };
    assert_eq!(complex.metadata, "schema-1");
    assert_eq!(*complex.value, value(json!({ "name": "x" })));
    assert_eq!(
        tree::get(&updated, &segments("name")).unwrap(),
        Some(Value::from("x"))
    );
}
