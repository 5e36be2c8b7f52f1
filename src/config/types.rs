//! Core configuration types
//!
//! This module defines the data structures that represent a git-dist.yml configuration file.

use crate::config::key::{option_map_from_yaml, OptionMap};
use crate::error::{ConfigError, ConfigResult};
use crate::runner::DEFAULT_TASK_NAME;
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Task namespace for overrides and templates (defaults to `git-dist`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Application usage description (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Per-step timeout in seconds; no timeout when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Options shared by every target
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub options: Mapping,

    /// Targets defined in the configuration
    #[serde(default)]
    pub targets: BTreeMap<String, Target>,
}

/// A named set of options to release with
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Target {
    /// Usage description for help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Longer description for help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Per-step timeout in seconds, overriding the top-level one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Options for this target; they win over the top-level options
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub options: Mapping,

    /// Load the target from another file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
}

impl Config {
    /// Task namespace
    pub fn task_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_TASK_NAME)
    }

    pub fn target(&self, name: &str) -> ConfigResult<&Target> {
        self.targets
            .get(name)
            .ok_or_else(|| ConfigError::TargetNotFound(name.to_string()))
    }

    /// Explicit options of a target, top-level options merged underneath
    pub fn target_options(&self, name: &str) -> ConfigResult<OptionMap> {
        let target = self.target(name)?;

        let mut merged = self.options.clone();
        for (key, value) in &target.options {
            merged.insert(key.clone(), value.clone());
        }

        let (options, unknown) = option_map_from_yaml(&merged)?;
        for option in unknown {
            warn!(target = name, option = %option, "ignoring unknown option");
        }
        Ok(options)
    }

    /// Step timeout for a target; the target's own setting wins
    pub fn timeout_for(&self, name: &str) -> Option<Duration> {
        self.targets
            .get(name)
            .and_then(|target| target.timeout)
            .or(self.timeout)
            .map(Duration::from_secs)
    }
}
