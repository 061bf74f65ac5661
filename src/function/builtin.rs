use super::{Function, FunctionResult};
use crate::value::{coerce, DataType, Value};
use rand::Rng;
use std::sync::Arc;

/// Defines the built-in function structs and the list that registers them.
macro_rules! define_functions {
    ( $( ($struct_name:ident, $name:expr, [$($arg:expr),*], $variadic:expr, $body:expr) ),* $(,)? ) => {
        $(
            struct $struct_name;
            impl Function for $struct_name {
                fn name(&self) -> &str { $name }
                fn arg_types(&self) -> &[DataType] { &[$($arg),*] }
                fn is_variadic(&self) -> bool { $variadic }
                fn call(&self, args: Vec<Value>) -> FunctionResult { ($body)(args) }
            }
        )*

        pub(super) fn all() -> Vec<Arc<dyn Function>> {
            vec![ $( Arc::new($struct_name) ),* ]
        }
    };
}

fn text(args: &[Value], index: usize) -> &str {
    args.get(index).and_then(Value::as_str).unwrap_or_default()
}

fn integer(args: &[Value], index: usize) -> i32 {
    match args.get(index) {
        Some(Value::Integer(n)) => *n,
        _ => 0,
    }
}

define_functions! {
    (Concat, "string.concat", [DataType::String], true, |args: Vec<Value>| -> FunctionResult {
        Ok(Value::String(args.iter().filter_map(Value::as_str).collect()))
    }),
    (Equals, "string.equals", [DataType::String, DataType::String], false, |args: Vec<Value>| -> FunctionResult {
        Ok(Value::Boolean(text(&args, 0) == text(&args, 1)))
    }),
    (EqualsIgnoreCase, "string.equalsIgnoreCase", [DataType::String, DataType::String], false, |args: Vec<Value>| -> FunctionResult {
        Ok(Value::Boolean(text(&args, 0).to_lowercase() == text(&args, 1).to_lowercase()))
    }),
    (Length, "string.length", [DataType::String], false, |args: Vec<Value>| -> FunctionResult {
        let count = text(&args, 0).chars().count();
        Ok(Value::Integer(i32::try_from(count)?))
    }),
    (Substring, "string.substring", [DataType::String, DataType::Integer, DataType::Integer], false, |args: Vec<Value>| -> FunctionResult {
        let chars: Vec<char> = text(&args, 0).chars().collect();
        let (start, length) = (integer(&args, 1), integer(&args, 2));
        let start = usize::try_from(start).map_err(|_| format!("start index {} is negative", start))?;
        let length = usize::try_from(length).map_err(|_| format!("length {} is negative", length))?;
        let end = start
            .checked_add(length)
            .filter(|end| *end <= chars.len())
            .ok_or_else(|| format!("range {}..{} is out of bounds for length {}", start, start.saturating_add(length), chars.len()))?;
        Ok(Value::String(chars[start..end].iter().collect()))
    }),
    (ArrayLength, "array.length", [DataType::Any], false, |args: Vec<Value>| -> FunctionResult {
        let items = coerce::to_array(args.first().unwrap_or(&Value::Null))?;
        Ok(Value::Integer(i32::try_from(items.len())?))
    }),
    (Random, "number.random", [DataType::Integer], false, |args: Vec<Value>| -> FunctionResult {
        let limit = integer(&args, 0);
        if limit <= 0 {
            return Err(format!("limit must be positive, got {}", limit).into());
        }
        Ok(Value::Integer(rand::rng().random_range(0..limit)))
    }),
}
