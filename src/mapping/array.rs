//! Array (`foreach`) mappings: project each element of a source array into a
//! correspondingly shaped element of a target array.

use super::assign::{write_to_scope, TargetRef};
use super::document::{ArrayFieldType, ArrayMappingDocument};
use super::source::{BareText, Source};
use crate::error::{MappingError, ValidationError};
use crate::expr::{Evaluator, Expr, Reference};
use crate::path::{self, FieldPath};
use crate::scope::Scope;
use crate::tree;
use crate::value::{coerce, Value};

const NEW_ARRAY: &str = "NEWARRAY";

/// Where a projected array's elements come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ArraySource {
    /// A fresh array of one element, built from scope references and literals.
    NewArray,
    Value(Source),
}

impl ArraySource {
    fn compile(from: &serde_json::Value, bare: BareText) -> Result<Self, MappingError> {
        match from {
            serde_json::Value::String(text) if text.trim().eq_ignore_ascii_case(NEW_ARRAY) => {
                Ok(ArraySource::NewArray)
            }
            other => Ok(ArraySource::Value(Source::expression(other, bare)?)),
        }
    }

    fn references_element(&self) -> bool {
        match self {
            ArraySource::NewArray => false,
            ArraySource::Value(source) => source.references_element(),
        }
    }

    fn value(&self, evaluator: &Evaluator<'_>) -> Result<Value, MappingError> {
        match self {
            ArraySource::NewArray => Ok(Value::Array(vec![Value::empty_object()])),
            ArraySource::Value(source) => source.evaluate(evaluator),
        }
    }

    /// Builds the projected array. Without fields the source value passes through as-is.
    fn project(
        &self,
        fields: &[FieldMapping],
        evaluator: &Evaluator<'_>,
    ) -> Result<Value, MappingError> {
        let source = self.value(evaluator)?;
        if fields.is_empty() {
            return Ok(source);
        }
        let items = coerce::to_array(&source)?;
        log::debug!("Projecting '{}' over {} element(s)", self, items.len());
        Ok(Value::Array(project(fields, &items, evaluator)?))
    }
}

impl std::fmt::Display for ArraySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArraySource::NewArray => f.write_str(NEW_ARRAY),
            ArraySource::Value(source) => write!(f, "{}", source),
        }
    }
}

/// One field of a projected element, written at `to` inside the element.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldMapping {
    Literal { to: FieldPath, value: Value },
    Reference { to: FieldPath, reference: Reference },
    Expression { to: FieldPath, expr: Expr },
    Foreach(ForeachMapping),
}

/// A nested projection inside an element.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeachMapping {
    pub from: ArraySource,
    pub to: FieldPath,
    pub fields: Box<[FieldMapping]>,
}

/// A compiled, validated array mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayMapping {
    pub target: TargetRef,
    pub from: ArraySource,
    pub fields: Box<[FieldMapping]>,
}

fn source_text(from: &serde_json::Value) -> String {
    match from {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Checks that `from` and `to` are present on a node and on every node below it.
fn check_node(doc: &ArrayMappingDocument) -> Result<(), ValidationError> {
    let missing_from = match &doc.from {
        serde_json::Value::Null => true,
        serde_json::Value::String(text) => text.trim().is_empty(),
        _ => false,
    };
    if missing_from {
        return Err(ValidationError::MissingSource(doc.to.clone()));
    }
    if doc.to.trim().is_empty() {
        return Err(ValidationError::MissingTarget(source_text(&doc.from)));
    }
    doc.fields.iter().try_for_each(check_node)
}

/// Parses a field target relative to the element: `name`, `$.name`, `$$['name']`, or `$$`.
fn element_path(text: &str) -> Result<FieldPath, MappingError> {
    let stripped = path::strip_input_prefix(text.trim());
    let relative = stripped
        .strip_prefix("$$")
        .or_else(|| stripped.strip_prefix("$."))
        .or_else(|| stripped.strip_prefix('$'))
        .unwrap_or(stripped);
    Ok(path::parse(relative)?)
}

impl FieldMapping {
    fn compile(doc: &ArrayMappingDocument) -> Result<Self, MappingError> {
        let to = element_path(&doc.to)?;
        let source = match doc.kind {
            ArrayFieldType::Foreach => {
                let fields = doc
                    .fields
                    .iter()
                    .map(FieldMapping::compile)
                    .collect::<Result<Box<[_]>, _>>()?;
                return Ok(FieldMapping::Foreach(ForeachMapping {
                    from: ArraySource::compile(&doc.from, BareText::ElementPath)?,
                    to,
                    fields,
                }));
            }
            ArrayFieldType::Literal => Source::literal(&doc.from),
            ArrayFieldType::Assign | ArrayFieldType::Object => {
                Source::assign(&doc.from, BareText::ElementPath)?
            }
            ArrayFieldType::Primitive | ArrayFieldType::Expression => {
                Source::expression(&doc.from, BareText::ElementPath)?
            }
        };
        Ok(match source {
            Source::Literal(value) => FieldMapping::Literal { to, value },
            Source::Reference(reference) => FieldMapping::Reference { to, reference },
            Source::Expression(expr) => FieldMapping::Expression { to, expr },
        })
    }

    fn target(&self) -> &FieldPath {
        match self {
            FieldMapping::Literal { to, .. }
            | FieldMapping::Reference { to, .. }
            | FieldMapping::Expression { to, .. } => to,
            FieldMapping::Foreach(nested) => &nested.to,
        }
    }

    /// The element reference this field reads, if any, for error reporting.
    fn element_dependency(&self) -> Option<String> {
        match self {
            FieldMapping::Literal { .. } => None,
            FieldMapping::Reference { reference, .. } => {
                matches!(reference, Reference::Element(_)).then(|| reference.to_string())
            }
            FieldMapping::Expression { expr, .. } => {
                expr.references_element().then(|| expr.to_string())
            }
            FieldMapping::Foreach(nested) => nested
                .from
                .references_element()
                .then(|| nested.from.to_string()),
        }
    }

    /// Writes this field into `slot`, returning the updated slot.
    fn apply(&self, evaluator: &Evaluator<'_>, slot: Value) -> Result<Value, MappingError> {
        let value = match self {
            FieldMapping::Literal { value, .. } => value.clone(),
            FieldMapping::Reference { reference, .. } => evaluator.resolve(reference)?,
            FieldMapping::Expression { expr, .. } => evaluator.evaluate(expr)?,
            FieldMapping::Foreach(nested) => nested.from.project(&nested.fields, evaluator)?,
        };
        tree::set(&slot, self.target().segments(), value)
    }
}

/// Builds one output element per source element, in source order. The first
/// failing element aborts the projection.
fn project(
    fields: &[FieldMapping],
    elements: &[Value],
    evaluator: &Evaluator<'_>,
) -> Result<Vec<Value>, MappingError> {
    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            let scoped = evaluator.with_element(element);
            let built = fields
                .iter()
                .try_fold(Value::empty_object(), |slot, field| field.apply(&scoped, slot))?;
            log::debug!("Projected element {} to '{}'", index, built);
            Ok(built)
        })
        .collect()
}

/// Rejects element references under a `NEWARRAY` node, which has no source element.
fn validate_fields(from: &ArraySource, fields: &[FieldMapping]) -> Result<(), ValidationError> {
    for field in fields {
        if *from == ArraySource::NewArray {
            if let Some(source_ref) = field.element_dependency() {
                return Err(ValidationError::ElementReferenceInNewArray {
                    target: field.target().to_string(),
                    source_ref,
                });
            }
        }
        if let FieldMapping::Foreach(nested) = field {
            validate_fields(&nested.from, &nested.fields)?;
        }
    }
    Ok(())
}

impl ArrayMapping {
    /// Compiles and validates an array mapping tree. The root must be a `foreach` node.
    pub fn compile(doc: &ArrayMappingDocument) -> Result<Self, MappingError> {
        if doc.kind != ArrayFieldType::Foreach {
            return Err(ValidationError::RootNotForeach(doc.kind.to_string()).into());
        }
        check_node(doc)?;

        let fields = doc
            .fields
            .iter()
            .map(FieldMapping::compile)
            .collect::<Result<Box<[_]>, _>>()?;
        let mapping = ArrayMapping {
            target: TargetRef::parse(&doc.to)?,
            from: ArraySource::compile(&doc.from, BareText::Literal)?,
            fields,
        };
        mapping.validate()?;
        Ok(mapping)
    }

    /// Walks every level of the tree looking for structural errors.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.from, &self.fields)
    }

    /// Builds the target array from the input scope and writes it to the output scope.
    pub fn apply(&self, evaluator: &Evaluator<'_>, output: &mut dyn Scope) -> Result<(), MappingError> {
        let built = self.from.project(&self.fields, evaluator)?;
        write_to_scope(&self.target, output, built)
    }
}
