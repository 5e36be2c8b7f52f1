//! Phase execution engine
//!
//! This module expands phases into steps, runs them through an executor,
//! and aggregates what happened into a report.

pub mod command;
pub mod context;
pub mod invoke;
pub mod phase;
pub mod report;
pub mod sequence;
pub mod step;

// Re-export main types
pub use command::*;
pub use context::*;
pub use invoke::*;
pub use phase::*;
pub use report::*;
pub use sequence::*;
pub use step::*;
