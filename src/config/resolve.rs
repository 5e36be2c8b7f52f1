//! Option resolution
//!
//! Builds the effective configuration for one phase invocation: every key the
//! phase declares is looked up through the [`ScopeChain`], required keys are
//! validated exhaustively, and `${<task>.<key>}` templates are expanded.

use crate::config::interpolate::Templates;
use crate::config::key::{ConfigKey, KeyKind, OptionMap, Value};
use crate::config::scope::{KeyPath, OverrideLookup, Scope, ScopeChain};
use crate::error::{ConfigError, ConfigResult, Result};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Fully merged, validated configuration for one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfig {
    values: BTreeMap<ConfigKey, Value>,
}

impl ResolvedConfig {
    pub fn get(&self, key: ConfigKey) -> Option<&Value> {
        self.values.get(&key)
    }

    pub fn text(&self, key: ConfigKey) -> Option<&str> {
        self.get(key).and_then(Value::as_text)
    }

    /// A flag value; absent means `false`
    pub fn flag(&self, key: ConfigKey) -> bool {
        matches!(self.get(key), Some(Value::Flag(true)))
    }

    /// A list value; absent means empty
    pub fn list(&self, key: ConfigKey) -> &[String] {
        match self.get(key) {
            Some(Value::List(items)) => items,
            _ => &[],
        }
    }

    /// Entries that carry a value
    pub fn entries(&self, key: ConfigKey) -> impl Iterator<Item = (&str, &str)> {
        let entries = match self.get(key) {
            Some(Value::Entries(entries)) => Some(entries),
            _ => None,
        };
        entries
            .into_iter()
            .flatten()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConfigKey, &Value)> {
        self.values.iter()
    }

}

impl FromIterator<(ConfigKey, Value)> for ResolvedConfig {
    fn from_iter<I: IntoIterator<Item = (ConfigKey, Value)>>(iter: I) -> Self {
        ResolvedConfig {
            values: iter.into_iter().collect(),
        }
    }
}

/// Keys a phase consumes
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    pub required: Vec<ConfigKey>,
    /// Optional keys with their default, if any
    pub optional: Vec<(ConfigKey, Option<Value>)>,
}

/// Resolve the configuration for one invocation.
///
/// Missing required keys (and `config` entries nobody supplied a value for)
/// are all collected before failing with [`ConfigError::MissingOptions`].
pub fn resolve(
    keys: &KeySet,
    options: &OptionMap,
    overrides: &dyn OverrideLookup,
    scope: &Scope,
) -> Result<ResolvedConfig> {
    let defaults: Vec<(ConfigKey, Value)> = keys
        .optional
        .iter()
        .filter_map(|(key, default)| default.clone().map(|value| (*key, value)))
        .collect();
    let chain = ScopeChain::new(scope, options, overrides, defaults);

    let mut values = BTreeMap::new();
    let mut missing = Vec::new();
    let mut invalid = Vec::new();

    let required = keys.required.iter().map(|key| (*key, true));
    let optional = keys.optional.iter().map(|(key, _)| (*key, false));

    for (key, is_required) in required.chain(optional) {
        if values.contains_key(&key) {
            continue;
        }

        match resolve_key(&chain, key, &mut missing) {
            Ok(Some(value)) => {
                values.insert(key, value);
            }
            Ok(None) if is_required => missing.push(key.to_string()),
            Ok(None) => {}
            Err(err) => invalid.push(err),
        }
    }

    let mut problems = Vec::new();
    if !missing.is_empty() {
        debug!(task = %scope.task, target = %scope.target, ?missing, "required options missing");
        problems.push(ConfigError::MissingOptions(missing));
    }
    problems.extend(invalid);
    if problems.len() > 1 {
        return Err(ConfigError::Multiple(problems).into());
    }
    if let Some(problem) = problems.pop() {
        return Err(problem.into());
    }

    let vars = template_vars(&chain);
    let templates = Templates::new(&scope.task, &vars);
    let mut resolved = BTreeMap::new();
    for (key, value) in values {
        resolved.insert(key, templates.expand_value(&value)?);
    }

    Ok(ResolvedConfig { values: resolved })
}

/// Resolve one key; `config` entries are resolved one by one through the chain
fn resolve_key(
    chain: &ScopeChain<'_>,
    key: ConfigKey,
    missing: &mut Vec<String>,
) -> ConfigResult<Option<Value>> {
    let declared = match chain.resolve(&KeyPath::key(key))? {
        Some(Value::Entries(declared)) => declared,
        other => return Ok(other),
    };

    let mut entries = BTreeMap::new();
    for name in declared.keys() {
        let path = KeyPath::entry(key, name.as_str());
        match chain.resolve(&path)? {
            Some(Value::Text(v)) => {
                entries.insert(name.clone(), Some(v));
            }
            _ => {
                missing.push(path.to_string());
                entries.insert(name.clone(), None);
            }
        }
    }
    Ok(Some(Value::Entries(entries)))
}

/// Values visible to `${<task>.<key>}` templates.
///
/// Every key is resolved, not only the ones the phase declares, so a commit
/// message can mention the tag. Unresolvable keys are simply absent.
fn template_vars(chain: &ScopeChain<'_>) -> HashMap<String, String> {
    let mut vars = HashMap::new();

    for key in ConfigKey::ALL {
        let Ok(Some(value)) = chain.resolve(&KeyPath::key(key)) else {
            continue;
        };
        match (key.kind(), value) {
            (KeyKind::Entries, Value::Entries(declared)) => {
                for name in declared.keys() {
                    let path = KeyPath::entry(key, name.as_str());
                    if let Ok(Some(Value::Text(v))) = chain.resolve(&path) {
                        vars.insert(path.to_string(), v);
                    }
                }
            }
            (_, value) => {
                vars.insert(key.to_string(), value.display());
            }
        }
    }

    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::scope::Overrides;
    use crate::error::{GitDistError, InterpolationError};

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn scope() -> Scope {
        Scope::new("git-dist", "release")
    }

    fn keys(required: &[ConfigKey], optional: &[(ConfigKey, Option<Value>)]) -> KeySet {
        KeySet {
            required: required.to_vec(),
            optional: optional.to_vec(),
        }
    }

    #[test]
    fn test_missing_keys_are_reported_together() {
        let keys = keys(&[ConfigKey::Url, ConfigKey::Branch, ConfigKey::Dir], &[]);
        let mut options = OptionMap::new();
        options.insert(ConfigKey::Branch, text("gh-pages"));

        let err = resolve(&keys, &options, &Overrides::new(), &scope()).unwrap_err();
        assert_eq!(
            err.missing_options(),
            Some(&["url".to_string(), "dir".to_string()][..])
        );
    }

    #[test]
    fn test_required_key_from_override() {
        let keys = keys(&[ConfigKey::Dir], &[]);
        let mut overrides = Overrides::new();
        overrides.set("git-dist.dir", "build");

        let resolved = resolve(&keys, &OptionMap::new(), &overrides, &scope()).unwrap();
        assert_eq!(resolved.text(ConfigKey::Dir), Some("build"));
    }

    #[test]
    fn test_defaults_fill_optional_keys() {
        let keys = keys(
            &[ConfigKey::Dir],
            &[
                (ConfigKey::Empty, Some(Value::Flag(false))),
                (ConfigKey::Message, None),
            ],
        );
        let mut options = OptionMap::new();
        options.insert(ConfigKey::Dir, text("/repo"));

        let resolved = resolve(&keys, &options, &Overrides::new(), &scope()).unwrap();
        assert_eq!(resolved.get(ConfigKey::Empty), Some(&Value::Flag(false)));
        assert_eq!(resolved.get(ConfigKey::Message), None);
        assert_eq!(resolved.iter().count(), 2);
    }

    #[test]
    fn test_undeclared_keys_are_ignored() {
        let keys = keys(&[ConfigKey::Dir], &[]);
        let mut options = OptionMap::new();
        options.insert(ConfigKey::Dir, text("/repo"));
        options.insert(ConfigKey::Url, text("ignored"));
        let mut overrides = Overrides::new();
        overrides.set("empty", "not-a-bool");

        let resolved = resolve(&keys, &options, &overrides, &scope()).unwrap();
        assert_eq!(resolved.get(ConfigKey::Url), None);
        assert_eq!(resolved.iter().count(), 1);
    }

    #[test]
    fn test_config_entries_missing_values_are_named() {
        let keys = keys(
            &[ConfigKey::Url],
            &[(ConfigKey::Config, Some(Value::Entries(BTreeMap::new())))],
        );
        let mut entries = BTreeMap::new();
        entries.insert("user.email".to_string(), None);
        entries.insert("user.name".to_string(), None);
        entries.insert("core.autocrlf".to_string(), Some("false".to_string()));
        let mut options = OptionMap::new();
        options.insert(ConfigKey::Config, Value::Entries(entries));
        let mut overrides = Overrides::new();
        overrides.set("git-dist.release.config.user.name", "Bot");

        let err = resolve(&keys, &options, &overrides, &scope()).unwrap_err();
        assert_eq!(
            err.missing_options(),
            Some(&["url".to_string(), "config.user.email".to_string()][..])
        );
    }

    #[test]
    fn test_config_entries_resolved_through_chain() {
        let keys = keys(&[], &[(ConfigKey::Config, Some(Value::Entries(BTreeMap::new())))]);
        let mut entries = BTreeMap::new();
        entries.insert("user.email".to_string(), None);
        let mut options = OptionMap::new();
        options.insert(ConfigKey::Config, Value::Entries(entries));
        let mut overrides = Overrides::new();
        overrides.set("config.user.email", "bot@example.com");

        let resolved = resolve(&keys, &options, &overrides, &scope()).unwrap();
        let entries: Vec<_> = resolved.entries(ConfigKey::Config).collect();
        assert_eq!(entries, vec![("user.email", "bot@example.com")]);
    }

    #[test]
    fn test_message_template_references_tag() {
        let keys = keys(&[ConfigKey::Dir], &[(ConfigKey::Message, None)]);
        let mut options = OptionMap::new();
        options.insert(ConfigKey::Dir, text("/repo"));
        options.insert(ConfigKey::Message, text("Release ${git-dist.tag}"));
        let mut overrides = Overrides::new();
        overrides.set("tag", "v2.0.0");

        let resolved = resolve(&keys, &options, &overrides, &scope()).unwrap();
        assert_eq!(resolved.text(ConfigKey::Message), Some("Release v2.0.0"));
    }

    #[test]
    fn test_template_uses_configured_namespace() {
        let keys = keys(&[ConfigKey::Message], &[]);
        let mut options = OptionMap::new();
        options.insert(ConfigKey::Message, text("on ${site.branch}"));
        options.insert(ConfigKey::Branch, text("gh-pages"));

        let resolved =
            resolve(&keys, &options, &Overrides::new(), &Scope::new("site", "docs")).unwrap();
        assert_eq!(resolved.text(ConfigKey::Message), Some("on gh-pages"));
    }

    #[test]
    fn test_template_to_unset_key_fails() {
        let keys = keys(&[ConfigKey::Message], &[]);
        let mut options = OptionMap::new();
        options.insert(ConfigKey::Message, text("Release ${git-dist.tag}"));

        let err = resolve(&keys, &options, &Overrides::new(), &scope()).unwrap_err();
        assert!(matches!(
            err,
            GitDistError::Interpolation(InterpolationError::UndefinedVariable(_))
        ));
    }

    #[test]
    fn test_invalid_and_missing_options_are_reported_together() {
        let keys = keys(&[ConfigKey::Dir], &[(ConfigKey::Empty, Some(Value::Flag(false)))]);
        let mut overrides = Overrides::new();
        overrides.set("empty", "maybe");

        let err = resolve(&keys, &OptionMap::new(), &overrides, &scope()).unwrap_err();
        assert_eq!(err.missing_options(), Some(&["dir".to_string()][..]));
        match err {
            GitDistError::Config(ConfigError::Multiple(problems)) => {
                assert_eq!(problems.len(), 2);
                assert!(matches!(
                    &problems[1],
                    ConfigError::InvalidValue { key, .. } if key == "empty"
                ));
            }
            other => panic!("expected several problems, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_override_for_declared_key() {
        let keys = keys(&[], &[(ConfigKey::Empty, Some(Value::Flag(false)))]);
        let mut overrides = Overrides::new();
        overrides.set("git-dist.release.empty", "perhaps");

        let err = resolve(&keys, &OptionMap::new(), &overrides, &scope()).unwrap_err();
        assert!(matches!(
            err,
            GitDistError::Config(ConfigError::InvalidValue { .. })
        ));
    }
}
