//! Application property lookup behind `$property[name]` references.

use crate::error::ParseError;
use crate::value::Value;
use ahash::AHashMap;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Environment variable holding a JSON table of property name to environment variable name.
pub const APP_PROPS_ENV: &str = "FLOWMAP_APP_PROPS_ENV";

/// Environment variable holding a comma-separated list of JSON property files.
pub const APP_PROPS_JSON: &str = "FLOWMAP_APP_PROPS_JSON";

/// A source of property values, consulted after the declared properties.
pub trait PropertyValueResolver: Send + Sync {
    fn name(&self) -> &str;
    fn lookup(&self, key: &str) -> Option<Value>;
}

/// Resolves properties from environment variables.
///
/// A key is tried as-is, then through the mapping table, then with dots
/// replaced by underscores, then upper-cased.
#[derive(Debug, Clone, Default)]
pub struct EnvValueResolver {
    mappings: AHashMap<String, String>,
}

#[derive(Deserialize)]
struct PropertyMappings {
    #[serde(default)]
    mappings: AHashMap<String, String>,
}

impl EnvValueResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mappings(mappings: AHashMap<String, String>) -> Self {
        EnvValueResolver { mappings }
    }

    /// Reads the mapping table from [`APP_PROPS_ENV`], if set.
    pub fn from_env() -> Result<Self, ParseError> {
        match env::var(APP_PROPS_ENV) {
            Ok(raw) if !raw.trim().is_empty() => {
                let parsed: PropertyMappings = serde_json::from_str(&raw).map_err(|e| {
                    ParseError::InvalidDocument(format!(
                        "Can not parse value set to '{}': {}",
                        APP_PROPS_ENV, e
                    ))
                })?;
                Ok(Self::with_mappings(parsed.mappings))
            }
            _ => Ok(Self::new()),
        }
    }
}

impl PropertyValueResolver for EnvValueResolver {
    fn name(&self) -> &str {
        "env"
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        if let Ok(value) = env::var(key) {
            return Some(Value::String(value));
        }
        if let Some(mapped) = self.mappings.get(key) {
            return env::var(mapped).ok().map(Value::String);
        }
        let underscored = key.replace('.', "_");
        if let Ok(value) = env::var(&underscored) {
            return Some(Value::String(value));
        }
        env::var(underscored.to_uppercase()).ok().map(Value::String)
    }
}

/// Resolves properties from preloaded JSON files. Later files override earlier ones.
#[derive(Debug, Clone, Default)]
pub struct JsonFileValueResolver {
    preload: AHashMap<String, Value>,
}

impl JsonFileValueResolver {
    pub fn from_paths<P: AsRef<Path>>(
        paths: impl IntoIterator<Item = P>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut preload = AHashMap::new();
        for path in paths {
            let content = fs::read_to_string(path.as_ref()).map_err(|e| {
                format!("Can not read '{}': {}", path.as_ref().display(), e)
            })?;
            let props: AHashMap<String, Value> = serde_json::from_str(&content)?;
            preload.extend(props);
        }
        Ok(JsonFileValueResolver { preload })
    }

    /// Loads the files listed in [`APP_PROPS_JSON`]. Returns `None` when it is unset.
    pub fn from_env() -> Result<Option<Self>, Box<dyn std::error::Error>> {
        match env::var(APP_PROPS_JSON) {
            Ok(list) if !list.trim().is_empty() => {
                let files = list.split(',').map(str::trim).filter(|f| !f.is_empty());
                Ok(Some(Self::from_paths(files)?))
            }
            _ => Ok(None),
        }
    }
}

impl PropertyValueResolver for JsonFileValueResolver {
    fn name(&self) -> &str {
        "json"
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        self.preload.get(key).cloned()
    }
}

/// Declared application properties plus the resolvers that supply undeclared ones.
#[derive(Clone, Default)]
pub struct PropertyProvider {
    properties: AHashMap<String, Value>,
    resolvers: Vec<Arc<dyn PropertyValueResolver>>,
}

impl PropertyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn PropertyValueResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// A provider wired to the process environment: the JSON files from
    /// [`APP_PROPS_JSON`] first, then environment variables.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let mut provider = Self::new();
        if let Some(json) = JsonFileValueResolver::from_env()? {
            provider = provider.with_resolver(Arc::new(json));
        }
        Ok(provider.with_resolver(Arc::new(EnvValueResolver::from_env()?)))
    }

    pub fn lookup(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.properties.get(key) {
            return Some(value.clone());
        }
        self.resolvers.iter().find_map(|resolver| {
            let found = resolver.lookup(key);
            if found.is_some() {
                log::debug!("Property '{}' resolved by '{}' resolver", key, resolver.name());
            }
            found
        })
    }

    /// Looks a name up in the environment resolvers only.
    pub fn lookup_env(&self, key: &str) -> Option<Value> {
        self.resolvers
            .iter()
            .filter(|resolver| resolver.name() == "env")
            .find_map(|resolver| resolver.lookup(key))
            .or_else(|| env::var(key).ok().map(Value::String))
    }
}

impl std::fmt::Debug for PropertyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyProvider")
            .field("properties", &self.properties)
            .field(
                "resolvers",
                &self.resolvers.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
