use super::array::ArrayMapping;
use super::assign::Mapping;
use super::document::{ArrayMappingDocument, MapperDocument, MappingDocument, MappingType};
use crate::error::{MappingError, RegistryError};
use crate::expr::{self, Evaluator};
use crate::function::{Function, FunctionRegistry};
use crate::scope::{Resolver, Scope};
use crate::value::Value;
use std::sync::Arc;

/// A mapping compiled ahead of time, of either kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledMapping {
    Assignment(Mapping),
    Array(ArrayMapping),
}

impl CompiledMapping {
    pub fn compile(doc: &MappingDocument) -> Result<Self, MappingError> {
        match doc.kind {
            MappingType::Array => {
                let array_doc = ArrayMappingDocument::from_json(&doc.value)?;
                Ok(CompiledMapping::Array(ArrayMapping::compile(&array_doc)?))
            }
            _ => Ok(CompiledMapping::Assignment(Mapping::compile(doc)?)),
        }
    }
}

/// Applies mappings between scopes using a fixed set of functions.
#[derive(Debug, Clone)]
pub struct MappingEngine {
    registry: Arc<FunctionRegistry>,
}

pub struct MappingEngineBuilder {
    registry: Option<FunctionRegistry>,
    include_builtins: bool,
    functions: Vec<Arc<dyn Function>>,
}

impl MappingEngineBuilder {
    pub fn new() -> Self {
        Self {
            registry: None,
            include_builtins: true,
            functions: Vec::new(),
        }
    }

    /// Adds a custom function on top of the base registry.
    pub fn with_function(mut self, function: Arc<dyn Function>) -> Self {
        self.functions.push(function);
        self
    }

    /// Starts from an existing registry instead of the built-ins.
    pub fn with_registry(mut self, registry: FunctionRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn without_builtins(mut self) -> Self {
        self.include_builtins = false;
        self
    }

    pub fn build(self) -> Result<MappingEngine, RegistryError> {
        let mut registry = match (self.registry, self.include_builtins) {
            (Some(registry), _) => registry,
            (None, true) => FunctionRegistry::with_builtins(),
            (None, false) => FunctionRegistry::new(),
        };
        for function in self.functions {
            registry.register(function)?;
        }
        Ok(MappingEngine {
            registry: Arc::new(registry),
        })
    }
}

impl Default for MappingEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for MappingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MappingEngine {
    /// An engine with the built-in functions.
    pub fn new() -> Self {
        MappingEngine {
            registry: Arc::new(FunctionRegistry::with_builtins()),
        }
    }

    pub fn builder() -> MappingEngineBuilder {
        MappingEngineBuilder::new()
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Compiles and applies one mapping document.
    pub fn apply_assignment(
        &self,
        doc: &MappingDocument,
        input: &dyn Scope,
        output: &mut dyn Scope,
        resolver: &dyn Resolver,
    ) -> Result<(), MappingError> {
        let compiled = CompiledMapping::compile(doc).inspect_err(|err| {
            log::error!("Invalid mapping to '{}': {}", doc.map_to, err);
        })?;
        self.run(&compiled, input, output, resolver)
    }

    /// Compiles, validates, and applies one array mapping document.
    pub fn apply_array_mapping(
        &self,
        doc: &ArrayMappingDocument,
        input: &dyn Scope,
        output: &mut dyn Scope,
        resolver: &dyn Resolver,
    ) -> Result<(), MappingError> {
        let compiled = ArrayMapping::compile(doc).inspect_err(|err| {
            log::error!("Invalid array mapping to '{}': {}", doc.to, err);
        })?;
        self.run_array_mapping(&compiled, input, output, resolver)
    }

    /// Applies every mapping in order, stopping at the first failure.
    pub fn apply_all(
        &self,
        doc: &MapperDocument,
        input: &dyn Scope,
        output: &mut dyn Scope,
        resolver: &dyn Resolver,
    ) -> Result<(), MappingError> {
        doc.mappings
            .iter()
            .try_for_each(|mapping| self.apply_assignment(mapping, input, output, resolver))
    }

    /// Compiles every mapping of a document up front.
    pub fn compile(&self, doc: &MapperDocument) -> Result<Vec<CompiledMapping>, MappingError> {
        doc.mappings.iter().map(CompiledMapping::compile).collect()
    }

    pub fn run(
        &self,
        compiled: &CompiledMapping,
        input: &dyn Scope,
        output: &mut dyn Scope,
        resolver: &dyn Resolver,
    ) -> Result<(), MappingError> {
        match compiled {
            CompiledMapping::Assignment(mapping) => self.run_mapping(mapping, input, output, resolver),
            CompiledMapping::Array(mapping) => {
                self.run_array_mapping(mapping, input, output, resolver)
            }
        }
    }

    pub fn run_mapping(
        &self,
        mapping: &Mapping,
        input: &dyn Scope,
        output: &mut dyn Scope,
        resolver: &dyn Resolver,
    ) -> Result<(), MappingError> {
        let evaluator = Evaluator::new(&self.registry, input, resolver);
        mapping.apply(&evaluator, output).inspect_err(|err| {
            log::error!("Mapping to '{}' failed: {}", mapping.target, err);
        })
    }

    pub fn run_array_mapping(
        &self,
        mapping: &ArrayMapping,
        input: &dyn Scope,
        output: &mut dyn Scope,
        resolver: &dyn Resolver,
    ) -> Result<(), MappingError> {
        let evaluator = Evaluator::new(&self.registry, input, resolver);
        mapping.apply(&evaluator, output).inspect_err(|err| {
            log::error!("Array mapping to '{}' failed: {}", mapping.target, err);
        })
    }

    /// Parses and evaluates a single expression against `input`.
    pub fn evaluate(
        &self,
        expression: &str,
        input: &dyn Scope,
        resolver: &dyn Resolver,
    ) -> Result<Value, MappingError> {
        let parsed = expr::parse(expression)?;
        Evaluator::new(&self.registry, input, resolver).evaluate(&parsed)
    }
}

/// Applies one mapping document with the given function registry.
pub fn apply_assignment(
    registry: &FunctionRegistry,
    doc: &MappingDocument,
    input: &dyn Scope,
    output: &mut dyn Scope,
    resolver: &dyn Resolver,
) -> Result<(), MappingError> {
    let evaluator = Evaluator::new(registry, input, resolver);
    match CompiledMapping::compile(doc)? {
        CompiledMapping::Assignment(mapping) => mapping.apply(&evaluator, output),
        CompiledMapping::Array(mapping) => mapping.apply(&evaluator, output),
    }
}

/// Applies one array mapping document with the given function registry.
pub fn apply_array_mapping(
    registry: &FunctionRegistry,
    doc: &ArrayMappingDocument,
    input: &dyn Scope,
    output: &mut dyn Scope,
    resolver: &dyn Resolver,
) -> Result<(), MappingError> {
    let evaluator = Evaluator::new(registry, input, resolver);
    ArrayMapping::compile(doc)?.apply(&evaluator, output)
}
