use crate::value::{DataType, Value};
use thiserror::Error;

/// Errors raised while parsing references, expressions, or mapping documents.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Invalid field path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    #[error("Unexpected character '{found}' at position {position} in '{input}'")]
    UnexpectedCharacter {
        input: String,
        found: char,
        position: usize,
    },

    #[error("Unterminated {what} starting at position {position} in '{input}'")]
    Unterminated {
        input: String,
        what: &'static str,
        position: usize,
    },

    #[error("Invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("Unexpected token '{found}' at position {position}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        position: usize,
    },

    #[error("Unexpected end of expression, expected {0}")]
    UnexpectedEnd(String),

    #[error("Invalid target reference '{reference}': {message}")]
    InvalidTarget { reference: String, message: String },

    #[error("Invalid mapping document: {0}")]
    InvalidDocument(String),
}

/// Errors raised when a reference addresses something that does not exist.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("Cannot find attribute '{0}' in scope")]
    AttributeNotFound(String),

    #[error("Unknown scope qualifier '{0}'")]
    UnknownScope(String),

    #[error("Property '{0}' could not be resolved")]
    PropertyNotFound(String),

    #[error("Invalid reference '{0}'")]
    InvalidReference(String),

    #[error("Element reference '{0}' can only be used inside an array mapping")]
    NoElementContext(String),
}

/// A value could not be converted to the type an operator, function, or attribute requires.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionError {
    #[error("Unable to coerce {found_type} value '{found}' to {target}")]
    Incompatible {
        found: Value,
        found_type: &'static str,
        target: DataType,
    },

    #[error("Value '{found}' is out of range for {target}")]
    OutOfRange { found: Value, target: DataType },

    #[error("Cannot address '{segment}' inside {found_type} value '{found}'")]
    NotAddressable {
        segment: String,
        found: Value,
        found_type: &'static str,
    },
}

/// Errors raised while applying operators or calling functions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error(
        "Type mismatch during operation '{operation}': expected {expected}, but found value '{found}'"
    )]
    TypeMismatch {
        operation: String,
        expected: String,
        found: Value,
    },

    #[error("Cannot run '{0}' operation on an empty value")]
    NilOperand(String),

    #[error("Integer division by zero")]
    DivisionByZero,

    #[error("Integer overflow during operation '{0}'")]
    Overflow(String),

    #[error("Function '{0}' is not registered")]
    UnknownFunction(String),

    #[error("Function '{function}' expects {expected} argument(s), but received {found}")]
    ArgumentCount {
        function: String,
        expected: String,
        found: usize,
    },

    #[error("Function '{function}' argument {index} validation failed: {source}")]
    ArgumentType {
        function: String,
        index: usize,
        #[source]
        source: CoercionError,
    },

    #[error("Execution failed for function '{function}': {message}")]
    FunctionFailed { function: String, message: String },

    #[error("Function '{function}' panicked: {message}")]
    FunctionPanicked { function: String, message: String },
}

/// Structural problems in a mapping definition, detected before it runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("The array mapping for '{0}' has no source array")]
    MissingSource(String),

    #[error("The array mapping from '{0}' has no target")]
    MissingTarget(String),

    #[error("An array mapping must start with a 'foreach' node, found '{0}'")]
    RootNotForeach(String),

    #[error("Invalid new array mapping: field '{target}' references the array element through '{source_ref}'")]
    ElementReferenceInNewArray { target: String, source_ref: String },
}

/// Errors raised while configuring a function registry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Function '{0}' is already registered")]
    DuplicateFunction(String),
}

/// Any failure that can surface from applying a mapping.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
