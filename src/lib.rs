//! WebDash - a JSON-configured local task orchestrator
//!
//! Tasks are defined in `webdash.config.json` files spread over a directory
//! tree. A task may depend on tasks from its own config or from any other
//! config, throttle itself with a frequency, and have its fields expanded
//! with keywords from the global `webdash-profile.json`.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod profile;
pub mod runner;
pub mod ui;

// Re-export commonly used types
pub use error::{Result, WebdashError};

/// Current version of WebDash
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
