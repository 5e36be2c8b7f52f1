//! Error types for git-dist

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for git-dist operations
pub type Result<T> = std::result::Result<T, GitDistError>;

/// Main error type for git-dist
#[derive(Error, Debug)]
pub enum GitDistError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Phase execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// Template interpolation errors
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Configuration parsing, resolution and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Target '{0}' is not defined")]
    TargetNotFound(String),

    #[error("Invalid value for '{key}': {error}")]
    InvalidValue { key: String, error: String },

    /// Every required option that no source could supply
    #[error("Required options missing: {}", .0.join(", "))]
    MissingOptions(Vec<String>),

    #[error("Failed to include file '{path}': {error}")]
    IncludeFile { path: PathBuf, error: String },

    /// Several problems found while resolving one invocation
    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ConfigError>),
}

impl ConfigError {
    /// Names of the missing options, if any are reported
    pub fn missing_options(&self) -> Option<&[String]> {
        match self {
            ConfigError::MissingOptions(keys) => Some(keys),
            ConfigError::Multiple(errors) => errors.iter().find_map(ConfigError::missing_options),
            _ => None,
        }
    }
}

/// Phase dispatch and step execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Unknown phase '{0}'")]
    UnknownPhase(String),

    /// A step exited non-zero or could not be spawned; carries the aggregated report
    #[error("{0}")]
    StepFailed(String),
}

/// Template interpolation errors
#[derive(Error, Debug)]
pub enum InterpolationError {
    #[error("Variable '{0}' is not defined")]
    UndefinedVariable(String),

    #[error("Recursive interpolation detected")]
    RecursiveInterpolation,
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;

impl GitDistError {
    /// Names of the missing options, if this is a validation failure
    pub fn missing_options(&self) -> Option<&[String]> {
        match self {
            GitDistError::Config(err) => err.missing_options(),
            _ => None,
        }
    }
}
