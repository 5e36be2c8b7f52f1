//! Configuration validation
//!
//! This module provides validation logic for configuration files.

use crate::config::types::Config;
use crate::error::{ConfigError, ConfigResult};

/// Validate a complete configuration
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    validate_task_name(config.task_name())?;
    validate_timeout("timeout", config.timeout)?;

    if config.targets.is_empty() {
        return Err(ConfigError::Invalid("No targets defined".to_string()));
    }

    for (name, target) in &config.targets {
        validate_target_name(name)?;
        validate_timeout(&format!("targets.{}.timeout", name), target.timeout)?;

        // Shapes of option values are checked by building the option map
        config.target_options(name)?;
    }

    Ok(())
}

fn validate_task_name(name: &str) -> ConfigResult<()> {
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(ConfigError::Invalid(format!(
            "Invalid task name '{}': must be non-empty without whitespace",
            name
        )));
    }
    Ok(())
}

/// Target names appear inside `task.target.key` override names
fn validate_target_name(name: &str) -> ConfigResult<()> {
    if name.is_empty() || name.contains('.') || name.contains(char::is_whitespace) {
        return Err(ConfigError::Invalid(format!(
            "Invalid target name '{}': must be non-empty without dots or whitespace",
            name
        )));
    }
    Ok(())
}

fn validate_timeout(key: &str, timeout: Option<u64>) -> ConfigResult<()> {
    match timeout {
        Some(0) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            error: "timeout must be at least one second".to_string(),
        }),
        _ => Ok(()),
    }
}
