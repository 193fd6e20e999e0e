//! Config discovery from command-line arguments
//!
//! Arguments map to a `(config, command)` pair:
//!
//! - no arguments: the nearest config in the working directory or its
//!   ancestors, command `all`
//! - `cmd` or `:cmd`: the config in the working directory, command `cmd`
//! - `path`, `path:cmd`: the config at `path` (a file, or a directory holding
//!   `webdash.config.json`), command `cmd` or `all`
//! - `path cmd`: the nearest config at `path` or its ancestors, command `cmd`

use crate::config::loaded::{Config, DEFAULT_COMMAND};
use crate::config::parse::CONFIG_FILE_NAME;
use crate::profile::RootProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Number of parent directories searched above the starting directory
pub const MAX_ANCESTRY_DEPTH: usize = 30;

/// Left side of `path:cmd`, if the argument has a non-empty one
pub fn path_with_command_precedence(arg: &str) -> Option<&str> {
    match arg.find(':') {
        Some(index) if index > 0 => Some(&arg[..index]),
        _ => None,
    }
}

/// Right side of `path:cmd`, if the argument has a non-empty one
pub fn command_with_path_precedence(arg: &str) -> Option<&str> {
    match arg.find(':') {
        Some(index) if index + 1 < arg.len() => Some(&arg[index + 1..]),
        _ => None,
    }
}

/// Resolves arguments to configs, relative to a working directory
#[derive(Clone)]
pub struct Locator {
    cwd: PathBuf,
    root: Arc<dyn RootProvider>,
}

impl Locator {
    pub fn new(cwd: impl Into<PathBuf>, root: Arc<dyn RootProvider>) -> Self {
        Locator {
            cwd: cwd.into(),
            root,
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn root(&self) -> &Arc<dyn RootProvider> {
        &self.root
    }

    /// Find the config and command named by `args`
    pub fn locate(&self, args: &[String]) -> Option<(Config, String)> {
        match args {
            [] => self
                .best_matching_config(&self.cwd, true)
                .map(|config| (config, DEFAULT_COMMAND.to_string())),
            [arg] => self.locate_single(arg),
            [path, command] => {
                let path = path_with_command_precedence(path).unwrap_or(path.as_str());
                self.best_matching_config(&self.cwd.join(path), true)
                    .map(|config| (config, command.clone()))
            }
            _ => None,
        }
    }

    fn locate_single(&self, arg: &str) -> Option<(Config, String)> {
        let path = path_with_command_precedence(arg);

        // A bare command in the working directory.
        if !arg.contains('/') && path.is_none() {
            let command = command_with_path_precedence(arg).unwrap_or(arg);
            if let Some(config) = self.best_matching_config(&self.cwd, false) {
                return Some((config, command.to_string()));
            }
        }

        // A config file or directory, optionally followed by `:command`.
        let target = path.unwrap_or(arg);
        let command = command_with_path_precedence(arg).unwrap_or(DEFAULT_COMMAND);
        if let Some(config) = self.best_matching_config(&self.cwd.join(target), false) {
            return Some((config, command.to_string()));
        }

        // Paths with a `/` but no colon may still name a command here.
        if path.is_none() {
            let command = command_with_path_precedence(arg).unwrap_or(arg);
            if let Some(config) = self.best_matching_config(&self.cwd, false) {
                return Some((config, command.to_string()));
            }
        }

        None
    }

    /// Load the config at `path`
    ///
    /// A file is loaded as is. For a directory, `webdash.config.json` inside
    /// it is tried, then (with `check_ancestry`) inside each parent up to
    /// [`MAX_ANCESTRY_DEPTH`] levels or the filesystem root.
    pub fn best_matching_config(&self, path: &Path, check_ancestry: bool) -> Option<Config> {
        if !path.is_dir() {
            return match Config::load(path, Arc::clone(&self.root)) {
                Ok(config) => Some(config),
                Err(e) => {
                    log::debug!("Invalid config: {} ({})", path.display(), e);
                    None
                }
            };
        }

        let start = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let depth = if check_ancestry { MAX_ANCESTRY_DEPTH + 1 } else { 1 };

        for directory in start.ancestors().take(depth) {
            let candidate = directory.join(CONFIG_FILE_NAME);
            if !candidate.is_file() {
                continue;
            }

            match Config::load(&candidate, Arc::clone(&self.root)) {
                Ok(config) => return Some(config),
                Err(e) => log::warn!("{}", e),
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Root;
    use std::fs;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn write_config(dir: &Path, names: &[&str]) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let commands: Vec<String> = names
            .iter()
            .map(|n| format!(r#"{{ "name": "{}", "action": "true" }}"#, n))
            .collect();
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(&path, format!(r#"{{ "commands": [{}] }}"#, commands.join(","))).unwrap();
        path.canonicalize().unwrap()
    }

    fn locator(cwd: &Path) -> Locator {
        Locator::new(cwd, Arc::new(Root::new(cwd, Vec::new())))
    }

    #[test]
    fn test_argument_splitting() {
        assert_eq!(path_with_command_precedence("a/b:cmd"), Some("a/b"));
        assert_eq!(path_with_command_precedence(":cmd"), None);
        assert_eq!(path_with_command_precedence("cmd"), None);
        assert_eq!(path_with_command_precedence("a:"), Some("a"));

        assert_eq!(command_with_path_precedence("a/b:cmd"), Some("cmd"));
        assert_eq!(command_with_path_precedence(":cmd"), Some("cmd"));
        assert_eq!(command_with_path_precedence("a:"), None);
        assert_eq!(command_with_path_precedence("cmd"), None);
        assert_eq!(command_with_path_precedence("a:b:c"), Some("b:c"));
    }

    #[test]
    fn test_no_arguments_uses_all() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(temp_dir.path(), &["all"]);

        let (config, command) = locator(temp_dir.path()).locate(&[]).unwrap();
        assert_eq!(config.path(), config_path);
        assert_eq!(command, "all");
    }

    #[test]
    fn test_no_arguments_searches_ancestors() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(temp_dir.path(), &["all"]);
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let (config, _) = locator(&nested).locate(&[]).unwrap();
        assert_eq!(config.path(), config_path);
    }

    #[test]
    fn test_bare_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(temp_dir.path(), &["build"]);

        let (config, command) = locator(temp_dir.path()).locate(&args(&["build"])).unwrap();
        assert_eq!(config.path(), config_path);
        assert_eq!(command, "build");

        let (_, command) = locator(temp_dir.path()).locate(&args(&[":build"])).unwrap();
        assert_eq!(command, "build");
    }

    #[test]
    fn test_bare_command_does_not_search_ancestors() {
        let temp_dir = TempDir::new().unwrap();
        write_config(temp_dir.path(), &["build"]);
        let nested = temp_dir.path().join("empty");
        fs::create_dir_all(&nested).unwrap();

        assert!(locator(&nested).locate(&args(&["build"])).is_none());
    }

    #[test]
    fn test_config_file_with_command() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        let config_path = sub.join("config.json");
        fs::write(
            &config_path,
            r#"{ "commands": [ { "name": "deploy", "action": "true" } ] }"#,
        )
        .unwrap();

        let (config, command) = locator(temp_dir.path())
            .locate(&args(&["sub/config.json:deploy"]))
            .unwrap();
        assert_eq!(config.path(), config_path.canonicalize().unwrap());
        assert_eq!(command, "deploy");
    }

    #[test]
    fn test_directory_without_command_uses_all() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(&temp_dir.path().join("lib"), &["all"]);

        let (config, command) = locator(temp_dir.path()).locate(&args(&["lib"])).unwrap();
        assert_eq!(config.path(), config_path);
        assert_eq!(command, "all");

        let (_, command) = locator(temp_dir.path()).locate(&args(&["lib:"])).unwrap();
        assert_eq!(command, "all");
    }

    #[test]
    fn test_directory_with_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(&temp_dir.path().join("lib"), &["test"]);

        let (config, command) = locator(temp_dir.path())
            .locate(&args(&["lib:test"]))
            .unwrap();
        assert_eq!(config.path(), config_path);
        assert_eq!(command, "test");
    }

    #[test]
    fn test_path_and_command_search_ancestors() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(temp_dir.path(), &["cmd"]);
        let some_dir = temp_dir.path().join("some").join("dir");
        fs::create_dir_all(&some_dir).unwrap();

        let (config, command) = locator(temp_dir.path())
            .locate(&args(&["some/dir", "cmd"]))
            .unwrap();
        assert_eq!(config.path(), config_path);
        assert_eq!(command, "cmd");
    }

    #[test]
    fn test_three_arguments_never_match() {
        let temp_dir = TempDir::new().unwrap();
        write_config(temp_dir.path(), &["a"]);

        assert!(locator(temp_dir.path())
            .locate(&args(&["a", "b", "c"]))
            .is_none());
    }

    #[test]
    fn test_invalid_config_is_skipped_during_ancestry_search() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(temp_dir.path(), &["all"]);
        let nested = temp_dir.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join(CONFIG_FILE_NAME), "{ not json").unwrap();

        let (config, _) = locator(&nested).locate(&[]).unwrap();
        assert_eq!(config.path(), config_path);
    }

    #[test]
    fn test_missing_path_does_not_match() {
        let temp_dir = TempDir::new().unwrap();
        assert!(locator(temp_dir.path())
            .locate(&args(&["missing/config.json"]))
            .is_none());
    }
}
