//! Common test utilities
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use webdash::config::CONFIG_FILE_NAME;
use webdash::profile::{Root, RootProvider, PROFILE_FILE_NAME};

/// Profile recognized as a WebDash root, with a few keywords
pub const PROFILE: &str = r#"{
    "myworld": { "rootDir": "this" },
    "greeting": { "word": "hello" },
    "path-add": ["$.rootDir()/bin"],
    "env": { "WORLD": "$.rootDir()" }
}"#;

/// Create a temporary WebDash root holding a webdash-profile.json
pub fn create_workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(PROFILE_FILE_NAME), PROFILE).unwrap();
    temp_dir
}

/// Write a webdash.config.json into `dir`, creating the directory
pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let config_path = dir.join(CONFIG_FILE_NAME);
    fs::write(&config_path, content).unwrap();
    config_path
}

/// Discover the root of a workspace created by `create_workspace`
pub fn load_root(dir: &Path) -> Arc<dyn RootProvider> {
    Arc::new(Root::discover(dir).unwrap())
}
