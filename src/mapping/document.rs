//! Serialized mapping definitions, as they appear in flow configuration.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// How a mapping's `value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "RawMappingType")]
pub enum MappingType {
    /// `value` is used verbatim.
    Literal,
    /// A `$` string is a reference, anything else a literal.
    Assign,
    /// `value` is tried as an expression, then as a reference, then as a literal.
    Expression,
    /// `value` is an [`ArrayMappingDocument`].
    Array,
}

/// Mapping types arrive as names or as legacy numeric codes.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawMappingType {
    Code(u64),
    Name(String),
}

impl TryFrom<RawMappingType> for MappingType {
    type Error = String;

    fn try_from(raw: RawMappingType) -> Result<Self, Self::Error> {
        match raw {
            RawMappingType::Code(1) => Ok(MappingType::Assign),
            RawMappingType::Code(2) => Ok(MappingType::Literal),
            RawMappingType::Code(3) => Ok(MappingType::Expression),
            RawMappingType::Code(5) => Ok(MappingType::Array),
            RawMappingType::Code(other) => Err(format!("Unsupported mapping type code {}", other)),
            RawMappingType::Name(name) => match name.to_ascii_lowercase().as_str() {
                "literal" => Ok(MappingType::Literal),
                "assign" => Ok(MappingType::Assign),
                "expression" => Ok(MappingType::Expression),
                "array" => Ok(MappingType::Array),
                _ => Err(format!("Unsupported mapping type '{}'", name)),
            },
        }
    }
}

/// One source-to-target mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingDocument {
    #[serde(rename = "mapTo")]
    pub map_to: String,
    #[serde(rename = "type")]
    pub kind: MappingType,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl MappingDocument {
    pub fn new(map_to: impl Into<String>, kind: MappingType, value: serde_json::Value) -> Self {
        MappingDocument {
            map_to: map_to.into(),
            kind,
            value,
        }
    }
}

/// Node kinds of an array mapping tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayFieldType {
    Foreach,
    #[default]
    Primitive,
    Expression,
    Assign,
    Literal,
    Object,
}

impl fmt::Display for ArrayFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArrayFieldType::Foreach => "foreach",
            ArrayFieldType::Primitive => "primitive",
            ArrayFieldType::Expression => "expression",
            ArrayFieldType::Assign => "assign",
            ArrayFieldType::Literal => "literal",
            ArrayFieldType::Object => "object",
        };
        f.write_str(name)
    }
}

/// A node of an array mapping tree: the root and every nested `foreach`
/// project `from` into `to`, the leaves map one field of each element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayMappingDocument {
    #[serde(default)]
    pub from: serde_json::Value,
    #[serde(default)]
    pub to: String,
    #[serde(rename = "type", default)]
    pub kind: ArrayFieldType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ArrayMappingDocument>,
}

impl ArrayMappingDocument {
    /// Reads an array mapping from a JSON object or from a string holding one.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ParseError> {
        let parsed = match value {
            serde_json::Value::String(text) => serde_json::from_str(text),
            other => serde_json::from_value(other.clone()),
        };
        parsed.map_err(|e| ParseError::InvalidDocument(format!("Invalid array mapping: {}", e)))
    }
}

/// An ordered list of mappings applied one after another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapperDocument {
    pub mappings: Vec<MappingDocument>,
}

impl MapperDocument {
    /// Parses either `{"mappings": [...]}` or a bare array of mappings.
    pub fn from_json_str(text: &str) -> Result<Self, ParseError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawMapper {
            Wrapped(MapperDocument),
            Bare(Vec<MappingDocument>),
        }

        match serde_json::from_str::<RawMapper>(text) {
            Ok(RawMapper::Wrapped(doc)) => Ok(doc),
            Ok(RawMapper::Bare(mappings)) => Ok(MapperDocument { mappings }),
            Err(e) => Err(ParseError::InvalidDocument(e.to_string())),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_json_str(&content)?)
    }
}
