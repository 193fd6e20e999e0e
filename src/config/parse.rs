//! Configuration file parsing

use crate::config::types::ConfigFile;
use crate::error::{ConfigError, ConfigResult};
use std::fs;
use std::io;
use std::path::Path;

/// File name looked up when a directory is given instead of a config file
pub const CONFIG_FILE_NAME: &str = "webdash.config.json";

/// Parse a configuration file from a path
pub fn parse_config_file(path: &Path) -> ConfigResult<ConfigFile> {
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound(path.display().to_string()),
        _ => ConfigError::Parse {
            path: path.to_path_buf(),
            reason: format!("Failed to read file: {}", e),
        },
    })?;

    parse_config(&contents, path)
}

/// Parse configuration from a string; `path` is only used for error reporting
pub fn parse_config(json: &str, path: &Path) -> ConfigResult<ConfigFile> {
    serde_json::from_str(json).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
