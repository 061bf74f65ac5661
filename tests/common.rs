//! Common test utilities for building scopes, engines, and mapping documents.
use flowmap::prelude::*;
use serde_json::json;

/// Builds an input scope of `any`-typed attributes from a JSON object.
#[allow(dead_code)]
pub fn input_scope(data: serde_json::Value) -> SimpleScope {
    SimpleScope::from_json(data).unwrap()
}

/// The input scope used across the expression tests.
///
/// `name` is "World", `count` is 5, `price` is 2.5, `empty` is nil.
#[allow(dead_code)]
pub fn sample_scope() -> SimpleScope {
    input_scope(json!({
        "name": "World",
        "count": 5,
        "price": 2.5,
        "flag": true,
        "empty": null,
        "numeric": "42",
        "customer": { "address": { "city": "Berlin" }, "tags": ["a", "b"] },
        "items": [ { "id": 1, "name": "pen" }, { "id": 2, "name": "ink" } ]
    }))
}

/// Declares an output scope with the given attribute names and types, all unset.
#[allow(dead_code)]
pub fn output_scope(attrs: &[(&str, DataType)]) -> SimpleScope {
    SimpleScope::with_attrs(
        attrs
            .iter()
            .map(|(name, data_type)| Attribute::new(*name, *data_type, Value::Null)),
    )
}

/// Parses and evaluates `expression` against `scope` with the built-in functions.
#[allow(dead_code)]
pub fn eval_in(expression: &str, scope: &SimpleScope) -> std::result::Result<Value, MappingError> {
    MappingEngine::new().evaluate(expression, scope, &ScopeResolver::new())
}

/// Evaluates `expression` against [`sample_scope`].
#[allow(dead_code)]
pub fn eval(expression: &str) -> std::result::Result<Value, MappingError> {
    eval_in(expression, &sample_scope())
}

/// Reads an attribute value from a scope, panicking if it is not declared.
#[allow(dead_code)]
pub fn attr_value(scope: &SimpleScope, name: &str) -> Value {
    scope.get_attr(name).unwrap().value.clone()
}

#[allow(dead_code)]
pub fn array_doc(data: serde_json::Value) -> ArrayMappingDocument {
    ArrayMappingDocument::from_json(&data).unwrap()
}
