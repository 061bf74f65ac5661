//! Conversions between value variants.
//!
//! Every conversion either succeeds or returns a [`CoercionError`]; there is no
//! silent fallback to a default. `Null` converts to the empty form of strings,
//! booleans, arrays, and objects, but not to a number.

use super::{ComplexObject, DataType, Object, Value};
use crate::error::CoercionError;

fn incompatible(value: &Value, target: DataType) -> CoercionError {
    CoercionError::Incompatible {
        found: value.clone(),
        found_type: value.type_name(),
        target,
    }
}

fn out_of_range(value: &Value, target: DataType) -> CoercionError {
    CoercionError::OutOfRange {
        found: value.clone(),
        target,
    }
}

/// Converts `value` to the requested type.
pub fn coerce(value: &Value, target: DataType) -> Result<Value, CoercionError> {
    Ok(match target {
        DataType::Any => value.clone(),
        DataType::String => Value::String(to_string(value)?),
        DataType::Integer => Value::Integer(to_integer(value)?),
        DataType::Long => Value::Long(to_long(value)?),
        DataType::Double => Value::Double(to_double(value)?),
        DataType::Boolean => Value::Boolean(to_boolean(value)?),
        DataType::Array => Value::Array(to_array(value)?),
        DataType::Object | DataType::Params => Value::Object(to_object(value)?),
        DataType::ComplexObject => match value {
            Value::Complex(_) => value.clone(),
            Value::Null => Value::Complex(ComplexObject::default()),
            other => Value::Complex(ComplexObject::new("", Value::Object(to_object(other)?))),
        },
    })
}

pub fn to_string(value: &Value) -> Result<String, CoercionError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Complex(complex) => to_string(&complex.value),
        other => Ok(other.to_string()),
    }
}

pub fn to_boolean(value: &Value) -> Result<bool, CoercionError> {
    match value {
        Value::Boolean(b) => Ok(*b),
        Value::Null => Ok(false),
        Value::Integer(n) => Ok(*n != 0),
        Value::Long(n) => Ok(*n != 0),
        Value::Double(f) => Ok(*f != 0.0),
        Value::String(s) => match s.trim() {
            "" => Ok(false),
            "true" | "TRUE" | "True" | "t" | "T" | "1" => Ok(true),
            "false" | "FALSE" | "False" | "f" | "F" | "0" => Ok(false),
            _ => Err(incompatible(value, DataType::Boolean)),
        },
        _ => Err(incompatible(value, DataType::Boolean)),
    }
}

pub fn to_long(value: &Value) -> Result<i64, CoercionError> {
    match value {
        Value::Integer(n) => Ok(i64::from(*n)),
        Value::Long(n) => Ok(*n),
        Value::Double(f) => {
            if f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                Ok(f.trunc() as i64)
            } else {
                Err(out_of_range(value, DataType::Long))
            }
        }
        Value::Boolean(b) => Ok(i64::from(*b)),
        Value::String(s) => {
            let text = s.trim();
            if let Ok(n) = text.parse::<i64>() {
                return Ok(n);
            }
            match text.parse::<f64>() {
                Ok(f) => to_long(&Value::Double(f)),
                Err(_) => Err(incompatible(value, DataType::Long)),
            }
        }
        Value::Complex(complex) => to_long(&complex.value),
        _ => Err(incompatible(value, DataType::Long)),
    }
}

pub fn to_integer(value: &Value) -> Result<i32, CoercionError> {
    let wide = to_long(value).map_err(|err| match err {
        CoercionError::Incompatible { .. } => incompatible(value, DataType::Integer),
        _ => out_of_range(value, DataType::Integer),
    })?;
    i32::try_from(wide).map_err(|_| out_of_range(value, DataType::Integer))
}

pub fn to_double(value: &Value) -> Result<f64, CoercionError> {
    match value {
        Value::Integer(n) => Ok(f64::from(*n)),
        Value::Long(n) => Ok(*n as f64),
        Value::Double(f) => Ok(*f),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| incompatible(value, DataType::Double)),
        Value::Complex(complex) => to_double(&complex.value),
        _ => Err(incompatible(value, DataType::Double)),
    }
}

pub fn to_array(value: &Value) -> Result<Vec<Value>, CoercionError> {
    match value {
        Value::Array(items) => Ok(items.clone()),
        Value::Null => Ok(Vec::new()),
        Value::String(s) if s.trim().is_empty() => Ok(Vec::new()),
        Value::String(s) => match Value::from_json_str(s) {
            Ok(Value::Array(items)) => Ok(items),
            _ => Err(incompatible(value, DataType::Array)),
        },
        Value::Complex(complex) => to_array(&complex.value),
        _ => Err(incompatible(value, DataType::Array)),
    }
}

pub fn to_object(value: &Value) -> Result<Object, CoercionError> {
    match value {
        Value::Object(map) => Ok(map.clone()),
        Value::Null => Ok(Object::new()),
        Value::String(s) if s.trim().is_empty() => Ok(Object::new()),
        Value::String(s) => match Value::from_json_str(s) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Err(incompatible(value, DataType::Object)),
        },
        Value::Complex(complex) => to_object(&complex.inner()),
        _ => Err(incompatible(value, DataType::Object)),
    }
}
