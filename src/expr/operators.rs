//! Operator semantics over dynamically typed values.
//!
//! Numeric operands climb a promotion ladder: `Integer` to `Long` to `Double`.
//! Strings that hold numbers join the ladder as `Long` (or `Double` when they
//! have a fraction).

use super::ast::Operator;
use crate::error::EvaluationError;
use crate::value::{coerce, Value};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i32),
    Long(i64),
    Double(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => f64::from(n),
            Number::Long(n) => n as f64,
            Number::Double(f) => f,
        }
    }

    fn as_i64(self) -> i64 {
        match self {
            Number::Int(n) => i64::from(n),
            Number::Long(n) => n,
            Number::Double(f) => f.trunc() as i64,
        }
    }
}

fn type_mismatch(op: Operator, expected: &str, found: &Value) -> EvaluationError {
    EvaluationError::TypeMismatch {
        operation: op.symbol().to_string(),
        expected: expected.to_string(),
        found: found.clone(),
    }
}

fn numeric(op: Operator, value: &Value) -> Result<Number, EvaluationError> {
    match value {
        Value::Integer(n) => Ok(Number::Int(*n)),
        Value::Long(n) => Ok(Number::Long(*n)),
        Value::Double(f) => Ok(Number::Double(*f)),
        Value::String(s) => {
            let text = s.trim();
            if let Ok(n) = text.parse::<i64>() {
                Ok(Number::Long(n))
            } else if let Ok(f) = text.parse::<f64>() {
                Ok(Number::Double(f))
            } else {
                Err(type_mismatch(op, "Number", value))
            }
        }
        Value::Complex(complex) => numeric(op, &complex.value),
        _ => Err(type_mismatch(op, "Number", value)),
    }
}

fn unwrap_complex(value: Value) -> Value {
    match value {
        Value::Complex(complex) => *complex.value,
        other => other,
    }
}

/// Applies a binary operator to two already evaluated operands.
pub fn apply(op: Operator, left: Value, right: Value) -> Result<Value, EvaluationError> {
    let left = unwrap_complex(left);
    let right = unwrap_complex(right);
    match op {
        Operator::Or | Operator::And => logical(op, &left, &right),
        Operator::Equal => equals(op, &left, &right).map(Value::Boolean),
        Operator::NotEqual => equals(op, &left, &right).map(|eq| Value::Boolean(!eq)),
        Operator::Less | Operator::LessOrEqual | Operator::Greater | Operator::GreaterOrEqual => {
            compare(op, &left, &right)
        }
        Operator::Add
        | Operator::Subtract
        | Operator::Multiply
        | Operator::Divide
        | Operator::Modulo => arithmetic(op, &left, &right),
    }
}

/// Both sides are always coerced; there is no short-circuit.
fn logical(op: Operator, left: &Value, right: &Value) -> Result<Value, EvaluationError> {
    let l = coerce::to_boolean(left).map_err(|_| type_mismatch(op, "Boolean", left))?;
    let r = coerce::to_boolean(right).map_err(|_| type_mismatch(op, "Boolean", right))?;
    Ok(Value::Boolean(match op {
        Operator::Or => l || r,
        _ => l && r,
    }))
}

/// Equality is driven by the left operand's type; the right side is coerced to it.
/// Nil equals only nil.
fn equals(op: Operator, left: &Value, right: &Value) -> Result<bool, EvaluationError> {
    match (left, right) {
        (Value::Null, Value::Null) => Ok(true),
        (Value::Null, _) | (_, Value::Null) => Ok(false),
        (Value::String(s), other) => coerce::to_string(other)
            .map(|r| *s == r)
            .map_err(|_| type_mismatch(op, "String", other)),
        (Value::Boolean(b), other) => coerce::to_boolean(other)
            .map(|r| *b == r)
            .map_err(|_| type_mismatch(op, "Boolean", other)),
        (Value::Array(items), other) => coerce::to_array(other)
            .map(|r| *items == r)
            .map_err(|_| type_mismatch(op, "Array", other)),
        (Value::Object(map), other) => coerce::to_object(other)
            .map(|r| *map == r)
            .map_err(|_| type_mismatch(op, "Object", other)),
        (l, r) => {
            let a = numeric(op, l)?;
            let b = numeric(op, r)?;
            Ok(match (a, b) {
                (Number::Double(_), _) | (_, Number::Double(_)) => a.as_f64() == b.as_f64(),
                _ => a.as_i64() == b.as_i64(),
            })
        }
    }
}

/// Ordering with a nil operand is false.
fn compare(op: Operator, left: &Value, right: &Value) -> Result<Value, EvaluationError> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Boolean(false));
    }
    let a = numeric(op, left)?;
    let b = numeric(op, right)?;
    let ordering = match (a, b) {
        (Number::Double(_), _) | (_, Number::Double(_)) => a.as_f64().partial_cmp(&b.as_f64()),
        _ => Some(a.as_i64().cmp(&b.as_i64())),
    };
    let Some(ordering) = ordering else {
        return Ok(Value::Boolean(false));
    };
    Ok(Value::Boolean(match op {
        Operator::Less => ordering == Ordering::Less,
        Operator::LessOrEqual => ordering != Ordering::Greater,
        Operator::Greater => ordering == Ordering::Greater,
        _ => ordering != Ordering::Less,
    }))
}

macro_rules! integer_arithmetic {
    ($name:ident, $ty:ty, $variant:ident) => {
        fn $name(op: Operator, a: $ty, b: $ty) -> Result<Value, EvaluationError> {
            if matches!(op, Operator::Divide | Operator::Modulo) && b == 0 {
                return Err(EvaluationError::DivisionByZero);
            }
            let result = match op {
                Operator::Add => a.checked_add(b),
                Operator::Subtract => a.checked_sub(b),
                Operator::Multiply => a.checked_mul(b),
                Operator::Divide => a.checked_div(b),
                _ => a.checked_rem(b),
            };
            result
                .map(Value::$variant)
                .ok_or_else(|| EvaluationError::Overflow(op.symbol().to_string()))
        }
    };
}

integer_arithmetic!(int_arithmetic, i32, Integer);
integer_arithmetic!(long_arithmetic, i64, Long);

/// `Integer` results that overflow 32 bits are computed again as `Long`.
fn promote_on_overflow(op: Operator, x: i32, y: i32) -> Result<Value, EvaluationError> {
    match int_arithmetic(op, x, y) {
        Err(EvaluationError::Overflow(_)) => long_arithmetic(op, i64::from(x), i64::from(y)),
        result => result,
    }
}

/// `+ - *` with a nil operand give `false`; `/ %` with a nil operand fail.
fn arithmetic(op: Operator, left: &Value, right: &Value) -> Result<Value, EvaluationError> {
    if left.is_null() || right.is_null() {
        return match op {
            Operator::Divide | Operator::Modulo => {
                Err(EvaluationError::NilOperand(op.symbol().to_string()))
            }
            _ => Ok(Value::Boolean(false)),
        };
    }
    let a = numeric(op, left)?;
    let b = numeric(op, right)?;

    match (op, a, b) {
        (Operator::Modulo, Number::Int(x), Number::Int(y)) => promote_on_overflow(op, x, y),
        (Operator::Modulo, _, _) => long_arithmetic(op, a.as_i64(), b.as_i64()),
        (_, Number::Double(_), _) | (_, _, Number::Double(_)) => {
            let (x, y) = (a.as_f64(), b.as_f64());
            Ok(Value::Double(match op {
                Operator::Add => x + y,
                Operator::Subtract => x - y,
                Operator::Multiply => x * y,
                _ => x / y,
            }))
        }
        (_, Number::Int(x), Number::Int(y)) => promote_on_overflow(op, x, y),
        _ => long_arithmetic(op, a.as_i64(), b.as_i64()),
    }
}
