//! Execution context for phase invocations
//!
//! The context carries everything about one invocation that is not an option
//! value: where it runs, how loud it is, and which target it belongs to.

use crate::config::{ResolvedConfig, Scope};
use colored::Colorize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default task namespace for overrides and templates
pub const DEFAULT_TASK_NAME: &str = "git-dist";

/// Execution context for one invocation
pub struct Context {
    /// Directory relative step working directories are resolved against
    pub working_dir: PathBuf,

    /// Configuration file path
    pub config_path: Option<PathBuf>,

    /// Task namespace and target
    pub scope: Scope,

    /// Per-step timeout; `None` waits forever
    pub timeout: Option<Duration>,

    /// Verbosity level
    pub verbosity: Verbosity,
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl Context {
    /// Create a new context for a target
    pub fn new(target: impl Into<String>) -> Self {
        Context {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_path: None,
            scope: Scope::new(DEFAULT_TASK_NAME, target),
            timeout: None,
            verbosity: Verbosity::Normal,
        }
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set the configuration file path
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Set the task namespace
    pub fn with_task_name(mut self, task: impl Into<String>) -> Self {
        self.scope.task = task.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Get the directory for the config file (or current dir)
    pub fn config_dir(&self) -> PathBuf {
        self.config_path
            .as_ref()
            .and_then(|p| p.parent())
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| self.working_dir.clone())
    }

    /// `task:target` label for messages
    pub fn label(&self) -> String {
        format!("{}:{}", self.scope.task, self.scope.target)
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{} {}", "[INFO]".cyan(), message);
        }
    }

    /// Print success report
    pub fn print_ok(&self, message: &str) {
        if self.verbosity >= Verbosity::Quiet {
            eprintln!("{} {}", "[OK]".green().bold(), message);
        }
    }

    /// Print debug message (only in verbose mode)
    pub fn print_debug(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{} {}", "[DEBUG]".dimmed(), message);
        }
    }

    /// Print a step about to run (only in verbose mode)
    pub fn print_run(&self, command_line: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{} {}", "[RUN]".yellow(), command_line);
        }
    }

    /// Print the resolved options (only in verbose mode)
    pub fn print_flags(&self, config: &ResolvedConfig) {
        if self.verbosity < Verbosity::Verbose {
            return;
        }
        for (key, value) in config.iter() {
            self.print_debug(&format!("{}: {}", key, value.display()));
        }
    }

    /// Print phase start message
    pub fn print_phase_start(&self, phase: &str) {
        self.print_info(&format!("Running {} {}", self.label(), phase));
    }
}
