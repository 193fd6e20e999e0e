//! Configuration parsing, loading and discovery
//!
//! This module handles `webdash.config.json` files: their serde shapes,
//! validation of task definitions, loaded configs with expanded tasks, and
//! locating a config from command-line arguments.

pub mod loaded;
pub mod locate;
pub mod parse;
pub mod schema;
pub mod types;

// Re-export main types
pub use loaded::*;
pub use locate::*;
pub use parse::*;
pub use schema::*;
pub use types::*;
