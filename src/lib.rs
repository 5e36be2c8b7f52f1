//! git-dist - release a build directory through git
//!
//! git-dist resolves a phase's options from a YAML configuration file,
//! command-line overrides and defaults, expands the phase into a fixed
//! sequence of git commands, runs them in order and reports the result.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod runner;

// Re-export commonly used types
pub use error::{GitDistError, Result};

/// Current version of git-dist
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
