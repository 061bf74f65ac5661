use crate::error::MappingError;
use crate::expr::{self, Evaluator, Expr, Reference};
use crate::path;
use crate::value::Value;
use std::fmt;

/// Where a mapped value comes from, decided once when the mapping is compiled.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Literal(Value),
    Reference(Reference),
    Expression(Expr),
}

/// How bare text (no `$`, not an expression) is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BareText {
    /// As the literal string itself.
    Literal,
    /// As a path into the current array element, when it parses as one.
    ElementPath,
}

impl Source {
    /// The JSON value, used verbatim.
    pub fn literal(value: &serde_json::Value) -> Self {
        Source::Literal(Value::from(value.clone()))
    }

    /// A `$` string is a reference; anything else is a literal.
    pub fn assign(value: &serde_json::Value, bare: BareText) -> Result<Self, MappingError> {
        match value {
            serde_json::Value::String(text) if text.starts_with('$') => {
                Ok(Source::Reference(expr::parse_reference(text.trim())?))
            }
            serde_json::Value::String(text) => Ok(Self::bare(text, bare)),
            other => Ok(Self::literal(other)),
        }
    }

    /// Tries the text as an expression, then as a reference, then as a literal.
    /// A parsed expression that is a single reference becomes a plain reference.
    pub fn expression(value: &serde_json::Value, bare: BareText) -> Result<Self, MappingError> {
        let text = match value {
            serde_json::Value::String(text) => text.trim(),
            other => return Ok(Self::literal(other)),
        };
        match expr::parse(text) {
            Ok(Expr::Reference(reference)) => Ok(Source::Reference(reference)),
            Ok(Expr::Literal(value)) => Ok(Source::Literal(value)),
            Ok(parsed) => Ok(Source::Expression(parsed)),
            Err(err) if text.starts_with('$') => {
                log::debug!("'{}' is not an expression ({}), using it as a reference", text, err);
                Ok(Source::Reference(expr::parse_reference(text)?))
            }
            Err(err) => {
                log::debug!("'{}' is not an expression ({}), using it as a literal", text, err);
                Ok(Self::bare(text, bare))
            }
        }
    }

    fn bare(text: &str, bare: BareText) -> Self {
        let is_path = !text.is_empty() && !text.contains(char::is_whitespace);
        match (bare, is_path) {
            (BareText::ElementPath, true) => match path::parse(text) {
                Ok(path) => Source::Reference(Reference::Element(path)),
                Err(_) => Source::Literal(Value::String(text.to_string())),
            },
            _ => Source::Literal(Value::String(text.to_string())),
        }
    }

    /// True if the value depends on the current array element.
    pub fn references_element(&self) -> bool {
        match self {
            Source::Literal(_) => false,
            Source::Reference(reference) => matches!(reference, Reference::Element(_)),
            Source::Expression(expr) => expr.references_element(),
        }
    }

    pub fn evaluate(&self, evaluator: &Evaluator<'_>) -> Result<Value, MappingError> {
        match self {
            Source::Literal(value) => Ok(value.clone()),
            Source::Reference(reference) => evaluator.resolve(reference),
            Source::Expression(expr) => evaluator.evaluate(expr),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Literal(value) => write!(f, "{}", value),
            Source::Reference(reference) => write!(f, "{}", reference),
            Source::Expression(expr) => write!(f, "{}", expr),
        }
    }
}
