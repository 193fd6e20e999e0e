//! Task execution engine
//!
//! This module handles the execution of tasks: keyword substitution, the
//! scheduling gate, dependency resolution and process spawning.

pub mod command;
pub mod context;
pub mod interpolate;
pub mod task;
pub mod when;

// Re-export main types
pub use command::*;
pub use context::*;
pub use interpolate::*;
pub use task::*;
pub use when::*;
