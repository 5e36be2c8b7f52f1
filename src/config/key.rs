//! Configuration keys and typed option values
//!
//! The set of keys a phase can consume is closed. Each key has a kind that
//! decides how raw YAML and raw override strings are turned into a [`Value`].

use crate::error::{ConfigError, ConfigResult};
use serde_yaml::{Mapping, Value as Yaml};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A recognized configuration key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    Url,
    Branch,
    Dir,
    Message,
    Tag,
    Config,
    Paths,
    Empty,
    Name,
    Email,
}

/// How values of a key are shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Text,
    Flag,
    List,
    Entries,
}

impl ConfigKey {
    /// Every key, in declaration order
    pub const ALL: [ConfigKey; 10] = [
        ConfigKey::Url,
        ConfigKey::Branch,
        ConfigKey::Dir,
        ConfigKey::Message,
        ConfigKey::Tag,
        ConfigKey::Config,
        ConfigKey::Paths,
        ConfigKey::Empty,
        ConfigKey::Name,
        ConfigKey::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::Url => "url",
            ConfigKey::Branch => "branch",
            ConfigKey::Dir => "dir",
            ConfigKey::Message => "message",
            ConfigKey::Tag => "tag",
            ConfigKey::Config => "config",
            ConfigKey::Paths => "paths",
            ConfigKey::Empty => "empty",
            ConfigKey::Name => "name",
            ConfigKey::Email => "email",
        }
    }

    pub fn kind(&self) -> KeyKind {
        match self {
            ConfigKey::Config => KeyKind::Entries,
            ConfigKey::Paths => KeyKind::List,
            ConfigKey::Empty => KeyKind::Flag,
            _ => KeyKind::Text,
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ConfigError::Invalid(format!("Unknown option '{}'", s)))
    }
}

/// A typed option value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Flag(bool),
    List(Vec<String>),
    /// git-config entries; `None` marks an entry that must come from an override
    Entries(BTreeMap<String, Option<String>>),
}

impl Value {
    /// Parse a raw override string for a key of the given kind
    pub fn from_override(kind: KeyKind, raw: &str, key: &str) -> ConfigResult<Value> {
        match kind {
            KeyKind::Text => Ok(Value::Text(raw.to_string())),
            KeyKind::Flag => parse_flag(raw)
                .map(Value::Flag)
                .ok_or_else(|| invalid(key, format!("'{}' is not a boolean", raw))),
            KeyKind::List => Ok(Value::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            KeyKind::Entries => Err(invalid(
                key,
                "git-config entries can only be overridden one at a time (config.<entry>)"
                    .to_string(),
            )),
        }
    }

    /// Convert a YAML value for a key of the given kind
    pub fn from_yaml(kind: KeyKind, yaml: &Yaml, key: &str) -> ConfigResult<Value> {
        match (kind, yaml) {
            (KeyKind::Text, _) => scalar(yaml)
                .map(Value::Text)
                .ok_or_else(|| invalid(key, "expected a string".to_string())),
            (KeyKind::Flag, Yaml::Bool(b)) => Ok(Value::Flag(*b)),
            (KeyKind::Flag, Yaml::String(s)) => parse_flag(s)
                .map(Value::Flag)
                .ok_or_else(|| invalid(key, format!("'{}' is not a boolean", s))),
            (KeyKind::Flag, _) => Err(invalid(key, "expected a boolean".to_string())),
            (KeyKind::List, Yaml::Sequence(items)) => items
                .iter()
                .map(|item| {
                    scalar(item).ok_or_else(|| invalid(key, "expected a list of strings".to_string()))
                })
                .collect::<ConfigResult<Vec<_>>>()
                .map(Value::List),
            (KeyKind::List, _) => scalar(yaml)
                .map(|s| Value::List(vec![s]))
                .ok_or_else(|| invalid(key, "expected a string or a list".to_string())),
            (KeyKind::Entries, Yaml::Mapping(map)) => entries(map, key).map(Value::Entries),
            (KeyKind::Entries, Yaml::Null) => Ok(Value::Entries(BTreeMap::new())),
            (KeyKind::Entries, _) => Err(invalid(key, "expected a mapping".to_string())),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Display form used in verbose output
    pub fn display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Flag(b) => b.to_string(),
            Value::List(items) => items.join(", "),
            Value::Entries(map) => map
                .iter()
                .map(|(k, v)| format!("{}={}", k, v.as_deref().unwrap_or("~")))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Explicit per-invocation options
pub type OptionMap = BTreeMap<ConfigKey, Value>;

/// Build an option map from a YAML mapping.
///
/// Names outside the closed key set are returned separately so the caller
/// can warn about them.
pub fn option_map_from_yaml(mapping: &Mapping) -> ConfigResult<(OptionMap, Vec<String>)> {
    let mut options = OptionMap::new();
    let mut unknown = Vec::new();

    for (name, yaml) in mapping {
        let name = scalar(name)
            .ok_or_else(|| ConfigError::Invalid("option names must be strings".to_string()))?;
        match name.parse::<ConfigKey>() {
            Ok(key) => {
                // A bare null means "not set here"
                if yaml.is_null() && key.kind() != KeyKind::Entries {
                    continue;
                }
                options.insert(key, Value::from_yaml(key.kind(), yaml, key.as_str())?);
            }
            Err(_) => unknown.push(name),
        }
    }

    Ok((options, unknown))
}

fn entries(map: &Mapping, key: &str) -> ConfigResult<BTreeMap<String, Option<String>>> {
    let mut result = BTreeMap::new();
    for (name, value) in map {
        let name = scalar(name)
            .ok_or_else(|| invalid(key, "entry names must be strings".to_string()))?;
        let value = match value {
            Yaml::Null => None,
            other => Some(scalar(other).ok_or_else(|| {
                invalid(&format!("{}.{}", key, name), "expected a scalar".to_string())
            })?),
        };
        result.insert(name, value);
    }
    Ok(result)
}

fn scalar(yaml: &Yaml) -> Option<String> {
    match yaml {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn invalid(key: &str, error: String) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        error,
    }
}
