use super::document::{MappingDocument, MappingType};
use super::source::{BareText, Source};
use crate::error::{MappingError, ParseError, ResolutionError};
use crate::expr::Evaluator;
use crate::path::{self, FieldPath, Segment};
use crate::scope::Scope;
use crate::tree;
use crate::value::{ComplexObject, DataType, Value};
use std::fmt;

/// A parsed write target: the attribute name plus a path inside its value.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetRef {
    pub attribute: String,
    pub path: FieldPath,
}

impl TargetRef {
    /// Parses `attr`, `attr.a[0].b`, or `$INPUT.attr...`.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let invalid = |message: &str| ParseError::InvalidTarget {
            reference: text.to_string(),
            message: message.to_string(),
        };
        let stripped = path::strip_input_prefix(text.trim());
        let parsed = path::parse(stripped)?;
        let (head, rest) = parsed
            .split_first()
            .ok_or_else(|| invalid("target is empty"))?;
        let attribute = match head {
            Segment::Name(name) | Segment::Key(name) => name.clone(),
            Segment::Index(_) => return Err(invalid("target must start with an attribute name")),
        };
        Ok(TargetRef {
            attribute,
            path: FieldPath::new(rest.to_vec()),
        })
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut full = FieldPath::new(vec![Segment::Name(self.attribute.clone())]);
        for segment in self.path.segments() {
            full.push(segment.clone());
        }
        write!(f, "{}", full)
    }
}

/// Writes `value` to the target in `output`.
///
/// A bare attribute target replaces the attribute value. A nested target
/// updates a copy of the current value and stores it back. Complex object
/// attributes keep their metadata.
pub fn write_to_scope(
    target: &TargetRef,
    output: &mut dyn Scope,
    value: Value,
) -> Result<(), MappingError> {
    let (data_type, current) = output
        .get_attr(&target.attribute)
        .map(|attr| (attr.data_type, attr.value.clone()))
        .ok_or_else(|| ResolutionError::AttributeNotFound(target.attribute.clone()))?;

    let updated = if target.path.is_empty() {
        value
    } else {
        tree::set(&current, target.path.segments(), value)?
    };

    let updated = match (data_type, current, updated) {
        (_, _, complex @ Value::Complex(_)) => complex,
        (DataType::ComplexObject, Value::Complex(existing), inner) => {
            Value::Complex(ComplexObject::new(existing.metadata, inner))
        }
        (_, _, other) => other,
    };
    log::debug!("Setting '{}' to '{}'", target, updated);
    output.set_attr_value(&target.attribute, updated)
}

/// A compiled single-value mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    pub target: TargetRef,
    pub source: Source,
}

impl Mapping {
    /// Classifies the document's value and parses its target. Array mappings
    /// are compiled by [`super::ArrayMapping::compile`] instead.
    pub fn compile(doc: &MappingDocument) -> Result<Self, MappingError> {
        let source = match doc.kind {
            MappingType::Literal => Source::literal(&doc.value),
            MappingType::Assign => Source::assign(&doc.value, BareText::Literal)?,
            MappingType::Expression => Source::expression(&doc.value, BareText::Literal)?,
            MappingType::Array => {
                return Err(ParseError::InvalidDocument(format!(
                    "mapping to '{}' is an array mapping",
                    doc.map_to
                ))
                .into());
            }
        };
        Ok(Mapping {
            target: TargetRef::parse(&doc.map_to)?,
            source,
        })
    }

    /// Evaluates the source against the input scope and writes it to the output scope.
    pub fn apply(&self, evaluator: &Evaluator<'_>, output: &mut dyn Scope) -> Result<(), MappingError> {
        let value = self.source.evaluate(evaluator)?;
        log::debug!("Mapping '{}' produced '{}'", self.source, value);
        write_to_scope(&self.target, output, value)
    }
}
