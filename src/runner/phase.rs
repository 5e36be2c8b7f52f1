//! Phase dispatch
//!
//! Each phase declares the keys it consumes and an ordered list of step
//! builders. Builders are plain functions of the resolved configuration.

use crate::config::{ConfigKey, KeySet, ResolvedConfig, Value};
use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::StepDescriptor;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Builds one step from the resolved configuration
pub type StepBuilder = fn(&ResolvedConfig) -> StepDescriptor;

const INIT_STEPS: &[StepBuilder] = &[init_clone, orphan_branch, clear_index];
const CLONE_STEPS: &[StepBuilder] = &[clone];
const ADD_STEPS: &[StepBuilder] = &[add];
const COMMIT_STEPS: &[StepBuilder] = &[add, commit];
const TAG_STEPS: &[StepBuilder] = &[tag];
const PUSH_STEPS: &[StepBuilder] = &[push];
const CONFIGURE_STEPS: &[StepBuilder] = &[config_user_name, config_user_email];

/// A release workflow operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Clone without checkout into a fresh orphan branch
    Init,
    Clone,
    Add,
    Commit,
    Tag,
    Push,
    /// Legacy: set `user.name` and `user.email` in the tracking clone
    Configure,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Init,
        Phase::Clone,
        Phase::Add,
        Phase::Commit,
        Phase::Tag,
        Phase::Push,
        Phase::Configure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::Clone => "clone",
            Phase::Add => "add",
            Phase::Commit => "commit",
            Phase::Tag => "tag",
            Phase::Push => "push",
            Phase::Configure => "configure",
        }
    }

    pub fn keys(&self) -> KeySet {
        use ConfigKey::*;

        let (required, optional) = match self {
            Phase::Init | Phase::Clone => (
                vec![Url, Branch, Dir],
                vec![(Config, Some(Value::Entries(BTreeMap::new())))],
            ),
            Phase::Add => (vec![Dir], vec![(Paths, Some(Value::List(Vec::new())))]),
            Phase::Commit => (
                vec![Dir],
                vec![
                    (Message, None),
                    (Empty, Some(Value::Flag(false))),
                    (Paths, Some(Value::List(Vec::new()))),
                ],
            ),
            Phase::Tag => (vec![Dir, Tag, Message], vec![]),
            Phase::Push => (vec![Url, Branch, Dir], vec![]),
            Phase::Configure => (vec![Name, Email, Dir], vec![]),
        };

        KeySet { required, optional }
    }

    pub fn builders(&self) -> &'static [StepBuilder] {
        match self {
            Phase::Init => INIT_STEPS,
            Phase::Clone => CLONE_STEPS,
            Phase::Add => ADD_STEPS,
            Phase::Commit => COMMIT_STEPS,
            Phase::Tag => TAG_STEPS,
            Phase::Push => PUSH_STEPS,
            Phase::Configure => CONFIGURE_STEPS,
        }
    }

    /// Expand this phase into its steps
    pub fn steps(&self, config: &ResolvedConfig) -> Vec<StepDescriptor> {
        self.builders().iter().map(|build| build(config)).collect()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = ExecutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .iter()
            .copied()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| ExecutionError::UnknownPhase(s.to_string()))
    }
}

/// Expand a phase name into step descriptors
pub fn dispatch(phase: &str, config: &ResolvedConfig) -> ExecutionResult<Vec<StepDescriptor>> {
    Ok(phase.parse::<Phase>()?.steps(config))
}

fn text(config: &ResolvedConfig, key: ConfigKey) -> String {
    config.text(key).unwrap_or_default().to_string()
}

fn dir(config: &ResolvedConfig) -> String {
    text(config, ConfigKey::Dir)
}

/// `--config key=value` pairs for every git-config entry
fn config_flags(config: &ResolvedConfig) -> Vec<String> {
    config
        .entries(ConfigKey::Config)
        .flat_map(|(k, v)| ["--config".to_string(), format!("{}={}", k, v)])
        .collect()
}

fn init_clone(config: &ResolvedConfig) -> StepDescriptor {
    let mut args = vec!["clone".to_string(), "--no-checkout".to_string()];
    args.extend(config_flags(config));
    args.push(text(config, ConfigKey::Url));
    args.push(dir(config));
    StepDescriptor::git(args)
}

fn orphan_branch(config: &ResolvedConfig) -> StepDescriptor {
    StepDescriptor::git(["checkout".to_string(), "--orphan".to_string(), text(config, ConfigKey::Branch)])
        .in_dir(dir(config))
}

fn clear_index(config: &ResolvedConfig) -> StepDescriptor {
    StepDescriptor::git(["rm", "-r", "--force", "--quiet", "--ignore-unmatch", "."]).in_dir(dir(config))
}

fn clone(config: &ResolvedConfig) -> StepDescriptor {
    let mut args = vec![
        "clone".to_string(),
        "--branch".to_string(),
        text(config, ConfigKey::Branch),
        "--single-branch".to_string(),
        "--recurse-submodules".to_string(),
    ];
    args.extend(config_flags(config));
    args.push(text(config, ConfigKey::Url));
    args.push(dir(config));
    StepDescriptor::git(args)
}

fn add(config: &ResolvedConfig) -> StepDescriptor {
    let mut args = vec!["add".to_string(), "--all".to_string()];
    let paths = config.list(ConfigKey::Paths);
    if !paths.is_empty() {
        args.push("--".to_string());
        args.extend(paths.iter().cloned());
    }
    StepDescriptor::git(args).in_dir(dir(config))
}

fn commit(config: &ResolvedConfig) -> StepDescriptor {
    let mut args = vec!["commit".to_string(), "--no-edit".to_string()];
    match config.text(ConfigKey::Message) {
        Some(message) => {
            args.push("--message".to_string());
            args.push(message.to_string());
        }
        None => args.push("--allow-empty-message".to_string()),
    }
    if config.flag(ConfigKey::Empty) {
        args.push("--allow-empty".to_string());
    }
    StepDescriptor::git(args).in_dir(dir(config))
}

fn tag(config: &ResolvedConfig) -> StepDescriptor {
    StepDescriptor::git([
        "tag".to_string(),
        "--annotate".to_string(),
        text(config, ConfigKey::Tag),
        "--message".to_string(),
        text(config, ConfigKey::Message),
    ])
    .in_dir(dir(config))
}

fn push(config: &ResolvedConfig) -> StepDescriptor {
    StepDescriptor::git([
        "push".to_string(),
        "--quiet".to_string(),
        "--tags".to_string(),
        text(config, ConfigKey::Url),
        text(config, ConfigKey::Branch),
    ])
    .in_dir(dir(config))
}

fn config_user_name(config: &ResolvedConfig) -> StepDescriptor {
    StepDescriptor::git(["config".to_string(), "user.name".to_string(), text(config, ConfigKey::Name)])
        .in_dir(dir(config))
}

fn config_user_email(config: &ResolvedConfig) -> StepDescriptor {
    StepDescriptor::git(["config".to_string(), "user.email".to_string(), text(config, ConfigKey::Email)])
        .in_dir(dir(config))
}
