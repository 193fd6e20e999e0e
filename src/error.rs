//! Error types for WebDash

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for WebDash operations
pub type Result<T> = std::result::Result<T, WebdashError>;

/// Main error type for WebDash
///
/// Returned by the operations that touch the WebDash root outside of a
/// config run, such as writing generated scripts.
#[derive(Error, Debug)]
pub enum WebdashError {
    /// Profile and root directory errors
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Configuration parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config file (searched: {0})")]
    NotFound(String),

    #[error("Not a valid WebDash config file: {path}. Reason: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Command #{index} has no usable [name] field")]
    MissingName { index: usize },

    #[error("Command #{index} is malformed: {reason}")]
    InvalidDefinition { index: usize, reason: String },

    #[error("Task '{0}' has neither [action] nor [actions]")]
    MissingActions(String),

    #[error("Failed to expand task field: {0}")]
    Interpolation(#[from] InterpolationError),
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("No command specified to run")]
    EmptyCommand,

    #[error("Command '{command}' could not be executed: {reason}")]
    Spawn { command: String, reason: String },
}

/// Keyword substitution errors
#[derive(Error, Debug)]
pub enum InterpolationError {
    #[error("Substitutions did not settle after {passes} passes (self-referential pattern?)")]
    RecursiveSubstitution { passes: usize },
}

/// Profile discovery and flattening errors
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error(
        "No webdash-profile.json with {{ \"myworld.rootDir\": \"this\" }} found in the ancestry of '{}'{}",
        .start.display(),
        parse_failure_note(.last_parse_error)
    )]
    RootNotFound {
        start: PathBuf,
        last_parse_error: Option<(PathBuf, String)>,
    },

    #[error("Tried to expand a non-object/non-array JSON element ({0})")]
    NotExpandable(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for substitution operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;

/// Specialized result type for profile operations
pub type ProfileResult<T> = std::result::Result<T, ProfileError>;

fn parse_failure_note(failure: &Option<(PathBuf, String)>) -> String {
    failure
        .as_ref()
        .map(|(path, err)| format!(" (last parse failure: {}: {})", path.display(), err))
        .unwrap_or_default()
}

/// Render the cycle closed by `reentered` as `a -> b -> a`
///
/// Stack entries before the first occurrence of `reentered` are left out.
pub fn describe_cycle<S: AsRef<str>>(stack: &[S], reentered: &str) -> String {
    let start = stack
        .iter()
        .position(|id| id.as_ref() == reentered)
        .unwrap_or(0);

    let mut chain: Vec<&str> = stack[start..].iter().map(|id| id.as_ref()).collect();
    chain.push(reentered);
    chain.join(" -> ")
}
