//! Tests for `foreach` array mappings.
mod common;
use common::*;
use flowmap::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Returns its argument and remembers every value it was called with.
struct Recorder {
    seen: Arc<Mutex<Vec<i64>>>,
}

impl Function for Recorder {
    fn name(&self) -> &str {
        "test.record"
    }

    fn arg_types(&self) -> &[DataType] {
        &[DataType::Long]
    }

    fn call(&self, args: Vec<Value>) -> FunctionResult {
        let value = args.into_iter().next().unwrap_or_default();
        if let Value::Long(n) = value {
            self.seen.lock().unwrap().push(n);
        }
        Ok(value)
    }
}

fn run(doc: serde_json::Value, input: &SimpleScope) -> std::result::Result<SimpleScope, MappingError> {
    let mut output = output_scope(&[("out", DataType::Array), ("payload", DataType::Object)]);
    MappingEngine::new().apply_array_mapping(&array_doc(doc), input, &mut output, &ScopeResolver::new())?;
    Ok(output)
}

fn out(doc: serde_json::Value, input: &SimpleScope) -> serde_json::Value {
    attr_value(&run(doc, input).unwrap(), "out").to_json()
}

fn validation_error(doc: serde_json::Value) -> ValidationError {
    match run(doc, &sample_scope()) {
        Err(MappingError::Validation(err)) => err,
        other => panic!("expected a validation error, got {:?}", other),
    }
}

#[test]
fn test_foreach_projects_fields() {
    let doc = json!({
        "from": "$flow.items",
        "to": "out",
        "type": "foreach",
        "fields": [
            { "from": "$.id", "to": "$.outId", "type": "primitive" },
            { "from": "name", "to": "label" }
        ]
    });
    assert_eq!(
        out(doc, &sample_scope()),
        json!([{ "outId": 1, "label": "pen" }, { "outId": 2, "label": "ink" }])
    );
}

#[test]
fn test_field_kinds_inside_elements() {
    let doc = json!({
        "from": "$flow.items",
        "to": "out",
        "type": "foreach",
        "fields": [
            { "from": "$flow.name", "to": "owner", "type": "assign" },
            { "from": "string.concat($.name, \"!\")", "to": "shout", "type": "expression" },
            { "from": "$.id * 10", "to": "$$['scaled id']", "type": "expression" },
            { "from": "fixed", "to": "kind", "type": "literal" }
        ]
    });
    assert_eq!(
        out(doc, &sample_scope()),
        json!([
            { "owner": "World", "shout": "pen!", "scaled id": 10, "kind": "fixed" },
            { "owner": "World", "shout": "ink!", "scaled id": 20, "kind": "fixed" }
        ])
    );
}

#[test]
fn test_whole_element_reference() {
    let doc = json!({
        "from": "$flow.customer.tags",
        "to": "out",
        "type": "foreach",
        "fields": [ { "from": "$$", "to": "tag" } ]
    });
    assert_eq!(out(doc, &sample_scope()), json!([{ "tag": "a" }, { "tag": "b" }]));
}

#[test]
fn test_nested_foreach() {
    let input = input_scope(json!({
        "orders": [
            { "id": 1, "lines": [ { "sku": "a" }, { "sku": "b" } ] },
            { "id": 2, "lines": [] }
        ]
    }));
    let doc = json!({
        "from": "$flow.orders",
        "to": "out",
        "type": "foreach",
        "fields": [
            { "from": "$.id", "to": "orderId" },
            {
                "from": "$.lines",
                "to": "skus",
                "type": "foreach",
                "fields": [ { "from": "$.sku", "to": "code" } ]
            }
        ]
    });
    assert_eq!(
        out(doc, &input),
        json!([
            { "orderId": 1, "skus": [ { "code": "a" }, { "code": "b" } ] },
            { "orderId": 2, "skus": [] }
        ])
    );
}

#[test]
fn test_foreach_without_fields_copies_elements() {
    let doc = json!({ "from": "$flow.items", "to": "out", "type": "foreach" });
    assert_eq!(
        out(doc, &sample_scope()),
        json!([{ "id": 1, "name": "pen" }, { "id": 2, "name": "ink" }])
    );
}

#[test]
fn test_nil_source_gives_empty_array() {
    let doc = json!({
        "from": "$flow.empty",
        "to": "out",
        "type": "foreach",
        "fields": [ { "from": "$.id", "to": "id" } ]
    });
    assert_eq!(out(doc, &sample_scope()), json!([]));
}

#[test]
fn test_non_array_source_is_error() {
    let doc = json!({
        "from": "$flow.name",
        "to": "out",
        "type": "foreach",
        "fields": [ { "from": "$.id", "to": "id" } ]
    });
    assert!(matches!(
        run(doc, &sample_scope()),
        Err(MappingError::Coercion(_))
    ));
}

#[test]
fn test_new_array_from_scope_values() {
    let doc = json!({
        "from": "NEWARRAY",
        "to": "out",
        "type": "foreach",
        "fields": [
            { "from": "$flow.name", "to": "name" },
            { "from": "$flow.count + 1", "to": "next", "type": "expression" },
            { "from": "lit", "to": "k", "type": "literal" }
        ]
    });
    assert_eq!(
        out(doc, &sample_scope()),
        json!([{ "name": "World", "next": 6, "k": "lit" }])
    );
}

#[test]
fn test_new_array_rejects_element_references() {
    let err = validation_error(json!({
        "from": "newarray",
        "to": "out",
        "type": "foreach",
        "fields": [ { "from": "$.name", "to": "n" } ]
    }));
    assert_eq!(
        err,
        ValidationError::ElementReferenceInNewArray {
            target: "n".to_string(),
            source_ref: "$.name".to_string(),
        }
    );
}

#[test]
fn test_nested_new_array_is_validated() {
    let err = validation_error(json!({
        "from": "$flow.items",
        "to": "out",
        "type": "foreach",
        "fields": [
            {
                "from": "NEWARRAY",
                "to": "extra",
                "type": "foreach",
                "fields": [ { "from": "string.length($.name)", "to": "len", "type": "expression" } ]
            }
        ]
    }));
    assert!(matches!(err, ValidationError::ElementReferenceInNewArray { .. }));
}

#[test]
fn test_root_must_be_foreach() {
    let err = validation_error(json!({ "from": "$flow.items", "to": "out", "type": "primitive" }));
    assert_eq!(err, ValidationError::RootNotForeach("primitive".to_string()));

    let err = validation_error(json!({ "from": "$flow.items", "to": "out" }));
    assert_eq!(err, ValidationError::RootNotForeach("primitive".to_string()));
}

#[test]
fn test_missing_source_or_target() {
    let err = validation_error(json!({ "to": "out", "type": "foreach" }));
    assert_eq!(err, ValidationError::MissingSource("out".to_string()));

    let err = validation_error(json!({ "from": "$flow.items", "type": "foreach" }));
    assert_eq!(err, ValidationError::MissingTarget("$flow.items".to_string()));

    let err = validation_error(json!({
        "from": "$flow.items",
        "to": "out",
        "type": "foreach",
        "fields": [ { "from": "", "to": "id" } ]
    }));
    assert_eq!(err, ValidationError::MissingSource("id".to_string()));
}

#[test]
fn test_array_mapping_from_json_string() {
    let text = r#"{"from":"$flow.items","to":"payload.lines","type":"foreach","fields":[{"from":"$.name","to":"name"}]}"#;
    let mapper = MapperDocument {
        mappings: vec![MappingDocument::new("payload", MappingType::Array, json!(text))],
    };
    let mut output = output_scope(&[("payload", DataType::Object)]);
    MappingEngine::new()
        .apply_all(&mapper, &sample_scope(), &mut output, &ScopeResolver::new())
        .unwrap();
    assert_eq!(
        attr_value(&output, "payload").to_json(),
        json!({ "lines": [{ "name": "pen" }, { "name": "ink" }] })
    );
}

#[test]
fn test_invalid_array_document() {
    let err = ArrayMappingDocument::from_json(&json!("not json"));
    assert!(matches!(err, Err(ParseError::InvalidDocument(_))));
}

#[test]
fn test_projection_preserves_order() {
    let rows: Vec<serde_json::Value> = (0..200).map(|i| json!({ "n": i })).collect();
    let input = input_scope(json!({ "rows": rows }));
    let doc = json!({
        "from": "$flow.rows",
        "to": "out",
        "type": "foreach",
        "fields": [ { "from": "$.n * 2", "to": "double", "type": "expression" } ]
    });
    let expected: Vec<serde_json::Value> = (0..200).map(|i| json!({ "double": i * 2 })).collect();
    assert_eq!(out(doc, &input), json!(expected));
}

#[test]
fn test_compiled_array_mapping_is_reusable() {
    let mapping = ArrayMapping::compile(&array_doc(json!({
        "from": "$flow.items",
        "to": "out",
        "type": "foreach",
        "fields": [ { "from": "$.id", "to": "id" } ]
    })))
    .unwrap();
    let engine = MappingEngine::new();

    for count in [1, 3] {
        let items: Vec<serde_json::Value> = (0..count).map(|i| json!({ "id": i })).collect();
        let input = input_scope(json!({ "items": items.clone() }));
        let mut output = output_scope(&[("out", DataType::Array)]);
        engine
            .run_array_mapping(&mapping, &input, &mut output, &ScopeResolver::new())
            .unwrap();
        assert_eq!(attr_value(&output, "out").to_json(), json!(items));
    }
}

#[test]
fn test_elements_are_projected_in_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let engine = MappingEngine::builder()
        .with_function(Arc::new(Recorder { seen: Arc::clone(&seen) }))
        .build()
        .unwrap();
    let rows: Vec<serde_json::Value> = (0..500).map(|i| json!({ "n": i })).collect();
    let input = input_scope(json!({ "rows": rows }));
    let doc = array_doc(json!({
        "from": "$flow.rows",
        "to": "out",
        "type": "foreach",
        "fields": [ { "from": "test.record($.n)", "to": "n", "type": "expression" } ]
    }));
    let mut output = output_scope(&[("out", DataType::Array)]);
    engine
        .apply_array_mapping(&doc, &input, &mut output, &ScopeResolver::new())
        .unwrap();
    assert_eq!(*seen.lock().unwrap(), (0..500).collect::<Vec<i64>>());
}

#[test]
fn test_failing_element_aborts_projection() {
    let input = input_scope(json!({
        "rows": [ { "n": 1 }, { "n": 0 }, { "n": "x" }, { "n": 5 } ]
    }));
    let doc = array_doc(json!({
        "from": "$flow.rows",
        "to": "out",
        "type": "foreach",
        "fields": [ { "from": "10 / $.n", "to": "ratio", "type": "expression" } ]
    }));
    let original = Value::from(json!(["keep"]));
    let mut output = SimpleScope::with_attrs([Attribute::new("out", DataType::Array, original.clone())]);

    let err = MappingEngine::new()
        .apply_array_mapping(&doc, &input, &mut output, &ScopeResolver::new())
        .unwrap_err();
    assert_eq!(err, MappingError::Evaluation(EvaluationError::DivisionByZero));
    assert_eq!(attr_value(&output, "out"), original);
}
