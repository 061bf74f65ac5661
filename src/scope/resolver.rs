use super::{PropertyProvider, Scope};
use crate::error::{MappingError, ResolutionError};
use crate::path::{self, FieldPath};
use crate::tree;
use crate::value::Value;
use ahash::AHashMap;
use std::borrow::Cow;

/// Qualifier that always names the scope handed to `resolve`.
const FLOW_QUALIFIER: &str = "flow";

/// Looks references such as `$flow.customer.name` up against a scope.
pub trait Resolver: Send + Sync {
    fn resolve(&self, reference: &str, scope: &dyn Scope) -> Result<Value, MappingError>;
}

/// Rewrites the legacy `$TriggerData` qualifier to `$flow`.
pub fn normalize_reference(text: &str) -> Cow<'_, str> {
    if text.contains("$TriggerData") {
        Cow::Owned(text.replace("$TriggerData", "$flow"))
    } else {
        Cow::Borrowed(text)
    }
}

fn strip_marker(reference: &str) -> Result<&str, ResolutionError> {
    reference
        .strip_prefix('$')
        .filter(|body| !body.is_empty())
        .ok_or_else(|| ResolutionError::InvalidReference(reference.to_string()))
}

/// Reads `path` from `scope`, where the first step names the attribute.
/// A missing attribute is an error; a missing field below it reads as `Null`.
fn read_attribute(scope: &dyn Scope, path: &FieldPath, reference: &str) -> Result<Value, MappingError> {
    let (head, rest) = path
        .split_first()
        .ok_or_else(|| ResolutionError::InvalidReference(reference.to_string()))?;
    let name = head
        .key()
        .ok_or_else(|| ResolutionError::InvalidReference(reference.to_string()))?;
    let attr = scope
        .get_attr(name)
        .ok_or_else(|| ResolutionError::AttributeNotFound(name.to_string()))?;
    Ok(tree::get(&attr.value, rest)?.unwrap_or(Value::Null))
}

/// Resolves `$attr.path` directly against the given scope, without qualifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicResolver;

impl Resolver for BasicResolver {
    fn resolve(&self, reference: &str, scope: &dyn Scope) -> Result<Value, MappingError> {
        let normalized = normalize_reference(reference);
        let body = strip_marker(&normalized)?;
        let path = path::parse(body)?;
        read_attribute(scope, &path, reference)
    }
}

/// Resolves scope-qualified references.
///
/// `$flow.x` reads from the scope passed to `resolve`; other qualifiers name
/// scopes registered with [`ScopeResolver::with_scope`]. `$property[name]` and
/// `$env[NAME]` go to the property provider.
#[derive(Default)]
pub struct ScopeResolver<'a> {
    scopes: AHashMap<String, &'a dyn Scope>,
    properties: PropertyProvider,
}

impl<'a> ScopeResolver<'a> {
    pub fn new() -> Self {
        ScopeResolver {
            scopes: AHashMap::new(),
            properties: PropertyProvider::new(),
        }
    }

    pub fn with_scope(mut self, qualifier: impl Into<String>, scope: &'a dyn Scope) -> Self {
        self.scopes.insert(qualifier.into(), scope);
        self
    }

    pub fn with_properties(mut self, properties: PropertyProvider) -> Self {
        self.properties = properties;
        self
    }

    fn resolve_property(&self, body: &str, reference: &str) -> Result<Option<Value>, MappingError> {
        let (kind, selector) = match body.split_once('[') {
            Some((kind @ ("property" | "env"), selector)) => (kind, selector),
            _ => return Ok(None),
        };
        let close = selector
            .find(']')
            .ok_or_else(|| ResolutionError::InvalidReference(reference.to_string()))?;
        let name = selector[..close].trim().trim_matches(|c| c == '"' || c == '\'');
        let rest = path::parse(&selector[close + 1..])?;

        let value = match kind {
            "env" => self.properties.lookup_env(name),
            _ => self.properties.lookup(name),
        }
        .ok_or_else(|| ResolutionError::PropertyNotFound(name.to_string()))?;
        Ok(Some(tree::get(&value, rest.segments())?.unwrap_or(Value::Null)))
    }
}

impl Resolver for ScopeResolver<'_> {
    fn resolve(&self, reference: &str, scope: &dyn Scope) -> Result<Value, MappingError> {
        let normalized = normalize_reference(reference);
        let body = strip_marker(&normalized)?;

        if let Some(value) = self.resolve_property(body, reference)? {
            log::debug!("Resolved property reference '{}' to '{}'", reference, value);
            return Ok(value);
        }

        let path = path::parse(body)?;
        let (qualifier, rest) = path
            .split_first()
            .and_then(|(head, rest)| head.key().map(|q| (q, rest)))
            .ok_or_else(|| ResolutionError::InvalidReference(reference.to_string()))?;
        let rest = FieldPath::new(rest.to_vec());

        let value = if qualifier == FLOW_QUALIFIER {
            read_attribute(scope, &rest, reference)?
        } else {
            let named = self
                .scopes
                .get(qualifier)
                .ok_or_else(|| ResolutionError::UnknownScope(qualifier.to_string()))?;
            read_attribute(*named, &rest, reference)?
        };
        log::debug!("Resolved reference '{}' to '{}'", reference, value);
        Ok(value)
    }
}
