use super::ast::{Expr, Reference};
use super::operators;
use crate::error::{MappingError, ResolutionError};
use crate::function::{self, FunctionRegistry};
use crate::scope::{Resolver, Scope};
use crate::tree;
use crate::value::{coerce, Value};

/// Evaluates expression trees against an input scope.
///
/// Holds borrowed handles only, so one evaluator can be shared by every
/// element of an array projection via [`Evaluator::with_element`].
#[derive(Clone, Copy)]
pub struct Evaluator<'a> {
    registry: &'a FunctionRegistry,
    scope: &'a dyn Scope,
    resolver: &'a dyn Resolver,
    element: Option<&'a Value>,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        registry: &'a FunctionRegistry,
        scope: &'a dyn Scope,
        resolver: &'a dyn Resolver,
    ) -> Self {
        Evaluator {
            registry,
            scope,
            resolver,
            element: None,
        }
    }

    /// An evaluator whose element-relative references read from `element`.
    pub fn with_element<'b>(&self, element: &'b Value) -> Evaluator<'b>
    where
        'a: 'b,
    {
        Evaluator {
            registry: self.registry,
            scope: self.scope,
            resolver: self.resolver,
            element: Some(element),
        }
    }

    pub fn registry(&self) -> &'a FunctionRegistry {
        self.registry
    }

    pub fn evaluate(&self, expr: &Expr) -> Result<Value, MappingError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Reference(reference) => self.resolve(reference),
            Expr::Binary { left, op, right } => {
                let (left, right) = rayon::join(|| self.evaluate(left), || self.evaluate(right));
                let (left, right) = (left?, right?);
                Ok(operators::apply(*op, left, right)?)
            }
            Expr::Ternary {
                condition,
                then,
                otherwise,
            } => {
                let value = self.evaluate(condition)?;
                let chosen = coerce::to_boolean(&value)?;
                if chosen {
                    self.evaluate(then)
                } else {
                    self.evaluate(otherwise)
                }
            }
            Expr::Call { name, args } => {
                let function = self.registry.lookup(name)?;
                let values = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                let result = function::invoke(function.as_ref(), values)?;
                log::debug!("Function '{}' returned '{}'", name, result);
                Ok(result)
            }
        }
    }

    /// Resolves a scope reference through the resolver, or an element reference
    /// against the current element. A missing element field reads as `Null`.
    pub fn resolve(&self, reference: &Reference) -> Result<Value, MappingError> {
        match reference {
            Reference::Scope(text) => self.resolver.resolve(text, self.scope),
            Reference::Element(path) => {
                let element = self
                    .element
                    .ok_or_else(|| ResolutionError::NoElementContext(reference.to_string()))?;
                Ok(tree::get(element, path.segments())?.unwrap_or(Value::Null))
            }
        }
    }
}
