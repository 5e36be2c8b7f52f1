//! Configuration parsing, validation and option resolution
//!
//! This module handles parsing of git-dist.yml configuration files, validation
//! of their structure, and resolving option values for a phase.

pub mod interpolate;
pub mod key;
pub mod parse;
pub mod resolve;
pub mod schema;
pub mod scope;
pub mod types;

// Re-export main types
pub use interpolate::*;
pub use key::*;
pub use parse::*;
pub use resolve::*;
pub use schema::*;
pub use scope::*;
pub use types::*;
