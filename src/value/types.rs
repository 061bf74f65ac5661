use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared type of a scope attribute or a function parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    #[default]
    Any,
    String,
    #[serde(alias = "int")]
    Integer,
    Long,
    #[serde(alias = "number", alias = "float")]
    Double,
    #[serde(alias = "bool")]
    Boolean,
    Object,
    Array,
    Params,
    #[serde(alias = "complexObject", alias = "complex")]
    ComplexObject,
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Any => "any",
            DataType::String => "string",
            DataType::Integer => "integer",
            DataType::Long => "long",
            DataType::Double => "double",
            DataType::Boolean => "boolean",
            DataType::Object => "object",
            DataType::Array => "array",
            DataType::Params => "params",
            DataType::ComplexObject => "complex_object",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "any" => Ok(DataType::Any),
            "string" => Ok(DataType::String),
            "integer" | "int" => Ok(DataType::Integer),
            "long" => Ok(DataType::Long),
            "double" | "number" | "float" => Ok(DataType::Double),
            "boolean" | "bool" => Ok(DataType::Boolean),
            "object" => Ok(DataType::Object),
            "array" => Ok(DataType::Array),
            "params" => Ok(DataType::Params),
            "complex_object" | "complexobject" | "complex" => Ok(DataType::ComplexObject),
            other => Err(format!("Unknown data type '{}'", other)),
        }
    }
}
