//! Named attribute containers that mappings read from and write to.

mod property;
mod resolver;

pub use property::{
    EnvValueResolver, JsonFileValueResolver, PropertyProvider, PropertyValueResolver,
    APP_PROPS_ENV, APP_PROPS_JSON,
};
pub use resolver::{normalize_reference, BasicResolver, Resolver, ScopeResolver};

use crate::error::{MappingError, ResolutionError};
use crate::value::{coerce, ComplexObject, DataType, Value};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// A named, typed slot in a scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub data_type: DataType,
    pub value: Value,
}

impl Attribute {
    pub fn new(name: impl Into<String>, data_type: DataType, value: impl Into<Value>) -> Self {
        Attribute {
            name: name.into(),
            data_type,
            value: value.into(),
        }
    }
}

/// A collection of attributes addressable by name.
pub trait Scope: Send + Sync {
    fn get_attr(&self, name: &str) -> Option<&Attribute>;

    /// Replaces the value of an existing attribute, coercing it to the attribute's declared type.
    fn set_attr_value(&mut self, name: &str, value: Value) -> Result<(), MappingError>;
}

/// An in-memory scope backed by an ordered map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleScope {
    attrs: IndexMap<String, Attribute>,
}

impl SimpleScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attrs(attrs: impl IntoIterator<Item = Attribute>) -> Self {
        SimpleScope {
            attrs: attrs
                .into_iter()
                .map(|attr| (attr.name.clone(), attr))
                .collect(),
        }
    }

    /// Adds or replaces an attribute declaration.
    pub fn add_attr(&mut self, attr: Attribute) {
        self.attrs.insert(attr.name.clone(), attr);
    }

    pub fn attrs(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs.values()
    }

    /// Builds a scope from a JSON object, one `any`-typed attribute per key.
    pub fn from_json(json: serde_json::Value) -> Result<Self, String> {
        match json {
            serde_json::Value::Object(map) => Ok(Self::with_attrs(
                map.into_iter()
                    .map(|(name, value)| Attribute::new(name, DataType::Any, Value::from(value))),
            )),
            other => Err(format!("Scope data must be a JSON object, found: {}", other)),
        }
    }

    /// Loads a scope of values from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let json: serde_json::Value = serde_json::from_str(&content)?;
        Ok(Self::from_json(json)?)
    }

    /// Builds a scope of typed attributes from a declaration object.
    ///
    /// Each key maps either to a type name (`"string"`) or to
    /// `{"type": "...", "value": ...}`.
    pub fn from_declaration(json: serde_json::Value) -> Result<Self, String> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawAttribute {
            TypeOnly(DataType),
            Full {
                #[serde(rename = "type", default)]
                data_type: DataType,
                #[serde(default)]
                value: serde_json::Value,
                #[serde(default)]
                metadata: Option<String>,
            },
        }

        let declarations: IndexMap<String, RawAttribute> =
            serde_json::from_value(json).map_err(|e| format!("Invalid scope declaration: {}", e))?;

        let attrs = declarations.into_iter().map(|(name, raw)| match raw {
            RawAttribute::TypeOnly(data_type) => Attribute::new(name, data_type, Value::Null),
            RawAttribute::Full {
                data_type,
                value,
                metadata,
            } => {
                let value = match (data_type, metadata) {
                    (DataType::ComplexObject, metadata) => Value::Complex(ComplexObject::new(
                        metadata.unwrap_or_default(),
                        Value::from(value),
                    )),
                    _ => Value::from(value),
                };
                Attribute::new(name, data_type, value)
            }
        });
        Ok(Self::with_attrs(attrs))
    }

    /// Renders attribute values as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.attrs
                .values()
                .map(|attr| (attr.name.clone(), attr.value.to_json()))
                .collect(),
        )
    }
}

impl Scope for SimpleScope {
    fn get_attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.get(name)
    }

    fn set_attr_value(&mut self, name: &str, value: Value) -> Result<(), MappingError> {
        let attr = self
            .attrs
            .get_mut(name)
            .ok_or_else(|| ResolutionError::AttributeNotFound(name.to_string()))?;
        attr.value = match value {
            Value::Null => Value::Null,
            other => coerce::coerce(&other, attr.data_type)?,
        };
        Ok(())
    }
}
