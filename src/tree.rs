//! Reading and writing values at a field path inside a value tree.
//!
//! Writes are copy-on-write: the input tree is never modified, and a failed
//! write leaves nothing behind. Trees held as JSON text are parsed before use,
//! and complex objects are addressed through their inner value.

use crate::error::{CoercionError, MappingError};
use crate::path::Segment;
use crate::value::{DataType, Object, Value};
use std::borrow::Cow;

/// How far past the end of an array a write may reach.
pub const MAX_ARRAY_PADDING: usize = 100_000;

fn looks_like_json(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

fn not_addressable(value: &Value, segment: impl ToString) -> MappingError {
    CoercionError::NotAddressable {
        segment: segment.to_string(),
        found: value.clone(),
        found_type: value.type_name(),
    }
    .into()
}

/// Parses a string holding a JSON object or array. Other values, and text
/// that only looks like JSON, are `None`.
fn parse_embedded(value: &Value) -> Option<Value> {
    match value {
        Value::String(text) if looks_like_json(text) => Value::from_json_str(text).ok(),
        _ => None,
    }
}

/// Reads the value at `path`. Returns `Ok(None)` when any step is missing,
/// including out-of-range indices.
pub fn get(tree: &Value, path: &[Segment]) -> Result<Option<Value>, MappingError> {
    let mut current: Cow<'_, Value> = match parse_embedded(tree) {
        Some(parsed) => Cow::Owned(parsed),
        None => Cow::Borrowed(tree),
    };

    for (i, segment) in path.iter().enumerate() {
        if let Value::Complex(complex) = current.as_ref() {
            current = Cow::Owned(complex.inner());
        }
        let next = match (segment, current.as_ref()) {
            (Segment::Name(key) | Segment::Key(key), Value::Object(map)) => map.get(key),
            (Segment::Index(index), Value::Array(items)) => items.get(*index),
            (_, scalar @ Value::String(_)) if i == 0 => {
                return Err(not_addressable(scalar, segment));
            }
            _ => None,
        };
        match next {
            Some(value) => current = Cow::Owned(value.clone()),
            None => return Ok(None),
        }
    }
    Ok(Some(current.into_owned()))
}

/// Returns a copy of `tree` with `value` written at `path`.
///
/// Missing intermediate containers are created: an object for a name step,
/// an array for an index step. Writing past the end of an array pads it with
/// empty objects, up to [`MAX_ARRAY_PADDING`] slots. An empty path replaces
/// the whole tree.
pub fn set(tree: &Value, path: &[Segment], value: Value) -> Result<Value, MappingError> {
    if path.is_empty() {
        return Ok(value);
    }
    let mut root = tree.clone();
    set_in(&mut root, path, value)?;
    Ok(root)
}

fn empty_container_for(segment: &Segment) -> Value {
    match segment {
        Segment::Index(_) => Value::Array(Vec::new()),
        _ => Value::Object(Object::new()),
    }
}

fn set_in(node: &mut Value, path: &[Segment], value: Value) -> Result<(), MappingError> {
    let Some((head, rest)) = path.split_first() else {
        *node = value;
        return Ok(());
    };

    if node.is_null() {
        *node = empty_container_for(head);
    }
    if let Some(parsed) = parse_embedded(node) {
        *node = parsed;
    }
    if let Value::Complex(complex) = node {
        let mut inner = complex.inner();
        set_in(&mut inner, path, value)?;
        complex.value = Box::new(inner);
        return Ok(());
    }

    match (head, node) {
        (Segment::Name(key) | Segment::Key(key), Value::Object(map)) => {
            if rest.is_empty() {
                map.insert(key.clone(), value);
                return Ok(());
            }
            let child = map
                .entry(key.clone())
                .or_insert_with(|| empty_container_for(&rest[0]));
            set_in(child, rest, value)
        }
        (Segment::Index(index), Value::Array(items)) => {
            if index.saturating_sub(items.len()) > MAX_ARRAY_PADDING {
                return Err(CoercionError::OutOfRange {
                    found: Value::Long(i64::try_from(*index).unwrap_or(i64::MAX)),
                    target: DataType::Array,
                }
                .into());
            }
            while items.len() < *index {
                items.push(Value::Object(Object::new()));
            }
            if items.len() == *index {
                items.push(Value::Null);
            }
            set_in(&mut items[*index], rest, value)
        }
        (segment, other) => Err(not_addressable(other, segment)),
    }
}
