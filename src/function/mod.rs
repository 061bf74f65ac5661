//! Named functions callable from expressions, e.g. `string.concat("a", $flow.b)`.

mod builtin;
mod registry;

pub use registry::FunctionRegistry;

use crate::error::EvaluationError;
use crate::value::{coerce, DataType, Value};
use std::panic::{self, AssertUnwindSafe};

/// What a function body returns. Errors are reported as [`EvaluationError::FunctionFailed`].
pub type FunctionResult = Result<Value, Box<dyn std::error::Error + Send + Sync>>;

/// Defines the contract for a function that can be called from an expression.
pub trait Function: Send + Sync {
    /// The qualified name used in calls, e.g. `string.concat`.
    fn name(&self) -> &str;

    /// Declared parameter types. For a variadic function the last type
    /// applies to every trailing argument.
    fn arg_types(&self) -> &[DataType];

    fn is_variadic(&self) -> bool {
        false
    }

    /// Runs the function on arguments already coerced to [`Function::arg_types`].
    fn call(&self, args: Vec<Value>) -> FunctionResult;
}

/// Checks argument count, coerces every argument to its declared type, and
/// runs the function. A panic inside the function is reported as an error.
pub fn invoke(function: &dyn Function, args: Vec<Value>) -> Result<Value, EvaluationError> {
    let args = coerce_arguments(function, args)?;
    let name = function.name();

    match panic::catch_unwind(AssertUnwindSafe(|| function.call(args))) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(EvaluationError::FunctionFailed {
            function: name.to_string(),
            message: err.to_string(),
        }),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            log::error!("Function '{}' panicked: {}", name, message);
            Err(EvaluationError::FunctionPanicked {
                function: name.to_string(),
                message,
            })
        }
    }
}

fn coerce_arguments(function: &dyn Function, args: Vec<Value>) -> Result<Vec<Value>, EvaluationError> {
    let params = function.arg_types();
    let count_error = |expected: String| EvaluationError::ArgumentCount {
        function: function.name().to_string(),
        expected,
        found: args.len(),
    };

    if function.is_variadic() {
        let required = params.len().saturating_sub(1);
        if args.len() < required {
            return Err(count_error(format!("at least {}", required)));
        }
    } else if args.len() != params.len() {
        return Err(count_error(params.len().to_string()));
    }

    args.iter()
        .enumerate()
        .map(|(index, arg)| {
            let target = params
                .get(index)
                .or(params.last())
                .copied()
                .unwrap_or(DataType::Any);
            coerce::coerce(arg, target).map_err(|source| EvaluationError::ArgumentType {
                function: function.name().to_string(),
                index,
                source,
            })
        })
        .collect()
}
