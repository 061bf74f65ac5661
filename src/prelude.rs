//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the flowmap crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowmap::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let mapper = MapperDocument::from_file("path/to/mappings.json")?;
//! let input = SimpleScope::from_file("path/to/input.json")?;
//! let mut output = SimpleScope::new();
//!
//! let engine = MappingEngine::new();
//! engine.apply_all(&mapper, &input, &mut output, &BasicResolver)?;
//! # Ok(())
//! # }
//! ```

// Mapping engine and documents
pub use crate::mapping::{
    ArrayMapping, ArrayMappingDocument, MapperDocument, Mapping, MappingDocument, MappingEngine,
    MappingType,
};

// Expressions and functions
pub use crate::expr::{Evaluator, Expr};
pub use crate::function::{Function, FunctionRegistry, FunctionResult};

// Values, paths, and scopes
pub use crate::path::{FieldPath, Segment};
pub use crate::scope::{
    Attribute, BasicResolver, PropertyProvider, Resolver, Scope, ScopeResolver, SimpleScope,
};
pub use crate::value::{ComplexObject, DataType, Value};

// Error types
pub use crate::error::{
    CoercionError, EvaluationError, MappingError, ParseError, RegistryError, ResolutionError,
    ValidationError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
