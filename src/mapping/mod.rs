//! Mapping documents, their compiled forms, and the engine that applies them.

mod array;
mod assign;
mod document;
mod engine;
mod source;

pub use array::{ArrayMapping, ArraySource, FieldMapping, ForeachMapping};
pub use assign::{write_to_scope, Mapping, TargetRef};
pub use document::{
    ArrayFieldType, ArrayMappingDocument, MapperDocument, MappingDocument, MappingType,
};
pub use engine::{
    apply_array_mapping, apply_assignment, CompiledMapping, MappingEngine, MappingEngineBuilder,
};
pub use source::{BareText, Source};
