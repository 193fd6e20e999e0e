//! CLI interface and argument parsing
//!
//! This module handles command-line parsing, the native commands, generated
//! shell scripts and shell completion.

pub mod app;
pub mod scripts;

// Re-export main types
pub use app::*;
