//! Override scope chain
//!
//! A configuration key is looked up in a fixed, precedence-ordered list of
//! sources: the invocation's own options, then overrides qualified by
//! `task.target.`, by `task.`, unqualified, and finally the phase defaults.
//! The first source that yields a value wins.

use crate::config::key::{ConfigKey, OptionMap, Value};
use crate::error::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::fmt;

/// Read-only access to scoped overrides (`task.target.key`, `task.key`, `key`)
pub trait OverrideLookup {
    fn lookup(&self, qualified: &str) -> Option<&str>;
}

/// Overrides collected from the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    values: HashMap<String, String>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `KEY=VALUE` pairs; later pairs win
    pub fn from_pairs<I, S>(pairs: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = Overrides::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                ConfigError::Invalid(format!("Override '{}' must have the form KEY=VALUE", pair))
            })?;
            if key.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Override '{}' has an empty key",
                    pair
                )));
            }
            overrides.set(key.trim(), value);
        }
        Ok(overrides)
    }

    pub fn set(&mut self, qualified: impl Into<String>, value: impl Into<String>) {
        self.values.insert(qualified.into(), value.into());
    }
}

impl OverrideLookup for Overrides {
    fn lookup(&self, qualified: &str) -> Option<&str> {
        self.values.get(qualified).map(String::as_str)
    }
}

/// The thing being resolved: a key, or one entry of the `config` key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    pub key: ConfigKey,
    pub entry: Option<String>,
}

impl KeyPath {
    pub fn key(key: ConfigKey) -> Self {
        KeyPath { key, entry: None }
    }

    pub fn entry(key: ConfigKey, entry: impl Into<String>) -> Self {
        KeyPath {
            key,
            entry: Some(entry.into()),
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entry {
            Some(entry) => write!(f, "{}.{}", self.key, entry),
            None => write!(f, "{}", self.key),
        }
    }
}

/// One link of the scope chain
pub trait OptionSource {
    /// Short name for diagnostics
    fn describe(&self) -> String;

    fn try_resolve(&self, path: &KeyPath) -> ConfigResult<Option<Value>>;
}

/// Options given explicitly for this invocation
pub struct InvocationSource<'a> {
    options: &'a OptionMap,
}

impl<'a> InvocationSource<'a> {
    pub fn new(options: &'a OptionMap) -> Self {
        InvocationSource { options }
    }
}

impl OptionSource for InvocationSource<'_> {
    fn describe(&self) -> String {
        "options".to_string()
    }

    fn try_resolve(&self, path: &KeyPath) -> ConfigResult<Option<Value>> {
        let value = self.options.get(&path.key);
        Ok(match (&path.entry, value) {
            (None, value) => value.cloned(),
            (Some(entry), Some(Value::Entries(entries))) => {
                entries.get(entry).cloned().flatten().map(Value::Text)
            }
            (Some(_), _) => None,
        })
    }
}

/// Overrides under one qualifier (`task.target`, `task`, or none)
pub struct OverrideSource<'a> {
    lookup: &'a dyn OverrideLookup,
    qualifier: Option<String>,
}

impl<'a> OverrideSource<'a> {
    pub fn new(lookup: &'a dyn OverrideLookup, qualifier: Option<String>) -> Self {
        OverrideSource { lookup, qualifier }
    }

    fn qualified(&self, path: &KeyPath) -> String {
        match &self.qualifier {
            Some(qualifier) => format!("{}.{}", qualifier, path),
            None => path.to_string(),
        }
    }
}

impl OptionSource for OverrideSource<'_> {
    fn describe(&self) -> String {
        match &self.qualifier {
            Some(qualifier) => format!("override {}.*", qualifier),
            None => "override *".to_string(),
        }
    }

    fn try_resolve(&self, path: &KeyPath) -> ConfigResult<Option<Value>> {
        let qualified = self.qualified(path);
        let Some(raw) = self.lookup.lookup(&qualified) else {
            return Ok(None);
        };

        if path.entry.is_some() {
            return Ok(Some(Value::Text(raw.to_string())));
        }
        Value::from_override(path.key.kind(), raw, &qualified).map(Some)
    }
}

/// Defaults declared by the phase
pub struct DefaultSource {
    defaults: Vec<(ConfigKey, Value)>,
}

impl DefaultSource {
    pub fn new(defaults: Vec<(ConfigKey, Value)>) -> Self {
        DefaultSource { defaults }
    }
}

impl OptionSource for DefaultSource {
    fn describe(&self) -> String {
        "default".to_string()
    }

    fn try_resolve(&self, path: &KeyPath) -> ConfigResult<Option<Value>> {
        if path.entry.is_some() {
            return Ok(None);
        }
        Ok(self
            .defaults
            .iter()
            .find(|(key, _)| *key == path.key)
            .map(|(_, value)| value.clone()))
    }
}

/// Names that qualify overrides for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub task: String,
    pub target: String,
}

impl Scope {
    pub fn new(task: impl Into<String>, target: impl Into<String>) -> Self {
        Scope {
            task: task.into(),
            target: target.into(),
        }
    }
}

/// Precedence-ordered collection of sources
pub struct ScopeChain<'a> {
    sources: Vec<Box<dyn OptionSource + 'a>>,
}

impl<'a> ScopeChain<'a> {
    /// invocation > task.target > task > global > defaults
    pub fn new(
        scope: &Scope,
        options: &'a OptionMap,
        overrides: &'a dyn OverrideLookup,
        defaults: Vec<(ConfigKey, Value)>,
    ) -> Self {
        let sources: Vec<Box<dyn OptionSource + 'a>> = vec![
            Box::new(InvocationSource::new(options)),
            Box::new(OverrideSource::new(
                overrides,
                Some(format!("{}.{}", scope.task, scope.target)),
            )),
            Box::new(OverrideSource::new(overrides, Some(scope.task.clone()))),
            Box::new(OverrideSource::new(overrides, None)),
            Box::new(DefaultSource::new(defaults)),
        ];
        ScopeChain { sources }
    }

    /// First defined value, or `None` when every source is silent
    pub fn resolve(&self, path: &KeyPath) -> ConfigResult<Option<Value>> {
        for source in &self.sources {
            if let Some(value) = source.try_resolve(path)? {
                tracing::trace!(key = %path, source = %source.describe(), "resolved option");
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}
