//! Template expansion for option values
//!
//! Values may reference other options through `${<task>.<key>}`, for example
//! `Release ${git-dist.tag}`. Any other `${NAME}` is looked up in the process
//! environment and left untouched when unset.

use crate::config::key::Value;
use crate::error::{InterpolationError, InterpolationResult};
use regex::Regex;
use std::collections::HashMap;
use std::env;
use std::sync::OnceLock;

/// Nested templates are expanded at most this many times
const MAX_PASSES: usize = 10;

fn template_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("template pattern is valid"))
}

/// Templates bound to one task namespace
pub struct Templates<'a> {
    namespace: &'a str,
    vars: &'a HashMap<String, String>,
}

impl<'a> Templates<'a> {
    /// `vars` is keyed by bare key path (`tag`, `config.user.name`)
    pub fn new(namespace: &'a str, vars: &'a HashMap<String, String>) -> Self {
        Templates { namespace, vars }
    }

    /// Expand every template in a string
    pub fn expand(&self, s: &str) -> InterpolationResult<String> {
        let mut result = s.to_string();

        for _ in 0..MAX_PASSES {
            let (expanded, changed) = self.expand_once(&result)?;
            if !changed {
                return Ok(expanded);
            }
            result = expanded;
        }

        Err(InterpolationError::RecursiveInterpolation)
    }

    /// Expand every string inside a value
    pub fn expand_value(&self, value: &Value) -> InterpolationResult<Value> {
        Ok(match value {
            Value::Text(s) => Value::Text(self.expand(s)?),
            Value::Flag(b) => Value::Flag(*b),
            Value::List(items) => Value::List(
                items
                    .iter()
                    .map(|s| self.expand(s))
                    .collect::<InterpolationResult<Vec<_>>>()?,
            ),
            Value::Entries(entries) => Value::Entries(
                entries
                    .iter()
                    .map(|(k, v)| {
                        let v = v.as_deref().map(|v| self.expand(v)).transpose()?;
                        Ok::<_, InterpolationError>((k.clone(), v))
                    })
                    .collect::<InterpolationResult<_>>()?,
            ),
        })
    }

    fn expand_once(&self, s: &str) -> InterpolationResult<(String, bool)> {
        let mut out = String::with_capacity(s.len());
        let mut last = 0;
        let mut changed = false;

        for caps in template_pattern().captures_iter(s) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&s[last..whole.start()]);
            last = whole.end();

            match self.lookup(name.as_str())? {
                Some(value) => {
                    out.push_str(&value);
                    changed = true;
                }
                None => out.push_str(whole.as_str()),
            }
        }
        out.push_str(&s[last..]);

        Ok((out, changed))
    }

    fn lookup(&self, name: &str) -> InterpolationResult<Option<String>> {
        let scoped = name
            .strip_prefix(self.namespace)
            .and_then(|rest| rest.strip_prefix('.'));

        match scoped {
            Some(key) => self
                .vars
                .get(key)
                .cloned()
                .map(Some)
                .ok_or_else(|| InterpolationError::UndefinedVariable(name.to_string())),
            None => Ok(env::var(name).ok()),
        }
    }
}
