use super::{builtin, Function};
use crate::error::{EvaluationError, RegistryError};
use ahash::AHashMap;
use itertools::Itertools;
use std::fmt;
use std::sync::Arc;

/// Functions available to expressions, keyed by qualified name.
///
/// Built once at startup and passed by reference into every evaluation.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: AHashMap<String, Arc<dyn Function>>,
}

impl FunctionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `string.*`, `array.*`, and `number.*` functions.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for function in builtin::all() {
            registry
                .functions
                .insert(function.name().to_string(), function);
        }
        registry
    }

    /// Adds a function. Registering a name twice is an error.
    pub fn register(&mut self, function: Arc<dyn Function>) -> Result<(), RegistryError> {
        let name = function.name().to_string();
        if self.functions.contains_key(&name) {
            return Err(RegistryError::DuplicateFunction(name));
        }
        log::debug!("Registered function '{}'", name);
        self.functions.insert(name, function);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&Arc<dyn Function>, EvaluationError> {
        self.functions
            .get(name)
            .ok_or_else(|| EvaluationError::UnknownFunction(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).sorted().collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionRegistry[{}]", self.names().iter().join(", "))
    }
}
