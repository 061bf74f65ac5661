//! Unit tests for values, coercions, scopes, properties, and error messages.
mod common;
use common::*;
use flowmap::scope::{EnvValueResolver, JsonFileValueResolver, PropertyValueResolver};
use flowmap::value::coerce;
use flowmap::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_value_display() {
    assert_eq!(Value::Null.to_string(), "");
    assert_eq!(Value::from("text").to_string(), "text");
    assert_eq!(Value::Double(3.0).to_string(), "3");
    assert_eq!(Value::Double(2.5).to_string(), "2.5");
    assert_eq!(Value::Long(9_000_000_000).to_string(), "9000000000");
    assert_eq!(Value::from(json!({ "a": [1, true] })).to_string(), r#"{"a":[1,true]}"#);
}

#[test]
fn test_json_numbers_narrow_to_integer() {
    assert_eq!(Value::from(json!(7)), Value::Integer(7));
    assert_eq!(Value::from(json!(3_000_000_000_i64)), Value::Long(3_000_000_000));
    assert_eq!(Value::from(json!(1.5)), Value::Double(1.5));
}

#[test]
fn test_object_keeps_insertion_order() {
    let value = Value::from_json_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
    let Value::Object(map) = value else {
        panic!("expected an object");
    };
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn test_coerce_scalars() {
    assert_eq!(coerce::coerce(&Value::from("42"), DataType::Integer).unwrap(), Value::Integer(42));
    assert_eq!(coerce::coerce(&Value::from("4.9"), DataType::Long).unwrap(), Value::Long(4));
    assert_eq!(coerce::coerce(&Value::Integer(3), DataType::Double).unwrap(), Value::Double(3.0));
    assert_eq!(coerce::coerce(&Value::from("true"), DataType::Boolean).unwrap(), Value::Boolean(true));
    assert_eq!(coerce::coerce(&Value::Integer(0), DataType::Boolean).unwrap(), Value::Boolean(false));
    assert_eq!(coerce::coerce(&Value::Double(1.5), DataType::String).unwrap(), Value::from("1.5"));
}

#[test]
fn test_coerce_null() {
    assert_eq!(coerce::coerce(&Value::Null, DataType::String).unwrap(), Value::from(""));
    assert_eq!(coerce::coerce(&Value::Null, DataType::Boolean).unwrap(), Value::Boolean(false));
    assert_eq!(coerce::coerce(&Value::Null, DataType::Array).unwrap(), Value::Array(vec![]));
    assert_eq!(coerce::coerce(&Value::Null, DataType::Object).unwrap(), Value::empty_object());
    assert!(coerce::coerce(&Value::Null, DataType::Integer).is_err());
}

#[test]
fn test_coerce_containers_from_json_text() {
    assert_eq!(
        coerce::coerce(&Value::from("[1, 2]"), DataType::Array).unwrap(),
        Value::Array(vec![Value::Integer(1), Value::Integer(2)])
    );
    assert_eq!(
        coerce::coerce(&Value::from(r#"{"a": 1}"#), DataType::Object).unwrap(),
        Value::from(json!({ "a": 1 }))
    );
    assert!(coerce::coerce(&Value::from("nope"), DataType::Array).is_err());
}

#[test]
fn test_coerce_out_of_range() {
    let err = coerce::coerce(&Value::Long(i64::MAX), DataType::Integer).unwrap_err();
    assert_eq!(
        err,
        CoercionError::OutOfRange {
            found: Value::Long(i64::MAX),
            target: DataType::Integer,
        }
    );
}

#[test]
fn test_coerce_complex_object() {
    let wrapped = coerce::coerce(&Value::from(json!({ "a": 1 })), DataType::ComplexObject).unwrap();
    assert_eq!(wrapped, Value::Complex(ComplexObject::new("", Value::from(json!({ "a": 1 })))));

    let complex = Value::Complex(ComplexObject::new("meta", Value::from("7")));
    assert_eq!(coerce::coerce(&complex, DataType::Integer).unwrap(), Value::Integer(7));
}

#[test]
fn test_data_type_names() {
    assert_eq!("int".parse::<DataType>().unwrap(), DataType::Integer);
    assert_eq!("Number".parse::<DataType>().unwrap(), DataType::Double);
    assert_eq!("complex_object".parse::<DataType>().unwrap(), DataType::ComplexObject);
    assert!("decimal".parse::<DataType>().is_err());
    assert_eq!(DataType::Boolean.to_string(), "boolean");
    assert_eq!(serde_json::from_value::<DataType>(json!("bool")).unwrap(), DataType::Boolean);
}

#[test]
fn test_scope_declaration() {
    let scope = SimpleScope::from_declaration(json!({
        "name": "string",
        "count": { "type": "integer", "value": 3 },
        "payload": { "type": "complexObject", "metadata": "m" }
    }))
    .unwrap();
    assert_eq!(scope.get_attr("name").unwrap().data_type, DataType::String);
    assert_eq!(attr_value(&scope, "count"), Value::Integer(3));
    assert_eq!(
        attr_value(&scope, "payload"),
        Value::Complex(ComplexObject::new("m", Value::Null))
    );
    assert!(SimpleScope::from_declaration(json!({ "x": "decimal" })).is_err());
}

#[test]
fn test_scope_set_attr_value() {
    let mut scope = output_scope(&[("total", DataType::Long)]);
    scope.set_attr_value("total", Value::from("12")).unwrap();
    assert_eq!(attr_value(&scope, "total"), Value::Long(12));

    let err = scope.set_attr_value("other", Value::Integer(1)).unwrap_err();
    assert_eq!(
        err,
        MappingError::Resolution(ResolutionError::AttributeNotFound("other".to_string()))
    );
    assert_eq!(scope.to_json(), json!({ "total": 12 }));
}

#[test]
fn test_scope_from_json_rejects_non_objects() {
    assert!(SimpleScope::from_json(json!([1, 2])).is_err());
    let scope = SimpleScope::from_json(json!({ "a": 1 })).unwrap();
    assert_eq!(scope.get_attr("a").unwrap().data_type, DataType::Any);
}

struct FixedResolver;

impl PropertyValueResolver for FixedResolver {
    fn name(&self) -> &str {
        "fixed"
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        (key == "region" || key == "tier").then(|| Value::from(format!("fixed-{}", key)))
    }
}

#[test]
fn test_property_lookup_order() {
    let provider = PropertyProvider::new()
        .with_property("region", "declared")
        .with_resolver(Arc::new(FixedResolver));
    assert_eq!(provider.lookup("region"), Some(Value::from("declared")));
    assert_eq!(provider.lookup("tier"), Some(Value::from("fixed-tier")));
    assert_eq!(provider.lookup("missing"), None);
}

#[test]
fn test_env_resolver_misses_unknown_keys() {
    let resolver = EnvValueResolver::new();
    assert_eq!(resolver.lookup("flowmap.surely.unset.property"), None);
}

#[test]
fn test_json_file_resolver() {
    let dir = std::env::temp_dir();
    let first = dir.join(format!("flowmap-props-a-{}.json", std::process::id()));
    let second = dir.join(format!("flowmap-props-b-{}.json", std::process::id()));
    std::fs::write(&first, r#"{"region": "eu", "limit": 5}"#).unwrap();
    std::fs::write(&second, r#"{"limit": 10}"#).unwrap();

    let resolver = JsonFileValueResolver::from_paths([&first, &second]).unwrap();
    assert_eq!(resolver.lookup("region"), Some(Value::from("eu")));
    assert_eq!(resolver.lookup("limit"), Some(Value::Integer(10)));

    std::fs::remove_file(first).unwrap();
    std::fs::remove_file(second).unwrap();
}

#[test]
fn test_error_messages() {
    assert_eq!(
        EvaluationError::DivisionByZero.to_string(),
        "Integer division by zero"
    );
    assert_eq!(
        MappingError::from(ResolutionError::AttributeNotFound("x".to_string())).to_string(),
        "Cannot find attribute 'x' in scope"
    );
    assert_eq!(
        ValidationError::RootNotForeach("primitive".to_string()).to_string(),
        "An array mapping must start with a 'foreach' node, found 'primitive'"
    );
    assert_eq!(
        CoercionError::Incompatible {
            found: Value::from("abc"),
            found_type: "string",
            target: DataType::Integer,
        }
        .to_string(),
        "Unable to coerce string value 'abc' to integer"
    );
}
