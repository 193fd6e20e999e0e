//! WebDash root directory and profile
//!
//! The root is the directory holding `webdash-profile.json`. The profile must
//! contain `{ "myworld": { "rootDir": "this" } }` to be recognized; this
//! guards against picking up an unrelated file of the same name.

use crate::error::{ProfileError, ProfileResult};
use crate::profile::flatten::{parse_json_file, Entry};
use crate::runner::Substitution;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the profile marking the root directory
pub const PROFILE_FILE_NAME: &str = "webdash-profile.json";

/// Environment variable consulted when the ancestry walk finds no profile
pub const ROOT_ENV_VAR: &str = "WEBDASH";

/// Keyword and value of the entry identifying a genuine profile
const ROOT_MARKER_KEYWORD: &str = "$#.myworld.rootDir";
const ROOT_MARKER_VALUE: &str = "this";

/// Project name used for storage and log subdirectories
const APP_NAME: &str = "webdash-client";

/// Keyword expanded to the root directory in every config
pub const ROOT_DIR_KEYWORD: &str = "$.rootDir()";

/// Services a config consumes from the root: the root directory and the
/// substitutions it contributes to every task field.
pub trait RootProvider {
    fn root_directory(&self) -> &Path;

    /// One `$#.<key.chain>` → value pair per profile leaf
    fn profile_substitutions(&self) -> Vec<Substitution>;

    /// Keywords valid in every config, e.g. `$.rootDir()`
    fn primary_substitutions(&self) -> Vec<Substitution>;
}

/// An external repository listed under `pull-projects` in the profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalProject {
    pub source: String,
    pub destination: String,
    pub exec: String,
    pub register: bool,
}

/// The discovered root directory with its flattened profile
#[derive(Debug, Clone)]
pub struct Root {
    directory: PathBuf,
    entries: Vec<Entry>,
}

impl Root {
    /// Build a root from a directory and profile entries.
    ///
    /// Primary keywords inside profile values are expanded once here.
    pub fn new(directory: impl Into<PathBuf>, entries: Vec<Entry>) -> Self {
        let mut root = Root {
            directory: directory.into(),
            entries: Vec::new(),
        };

        let primary = root.primary_substitutions();
        root.entries = entries
            .into_iter()
            .map(|mut entry| {
                if let Err(e) = entry.apply_substitutions_in_value(&primary) {
                    log::warn!("Profile entry '{}' left unexpanded: {}", entry.key(), e);
                }
                entry
            })
            .collect();

        root
    }

    /// Find the root by walking from `start` up through its ancestors,
    /// falling back to the directory named by `$WEBDASH`.
    pub fn discover(start: &Path) -> ProfileResult<Self> {
        log::debug!(
            "For finding {}, the search starts with the following directory and goes upwards: {}",
            PROFILE_FILE_NAME,
            start.display()
        );

        let mut last_parse_error = None;

        for directory in start.ancestors() {
            let profile_path = directory.join(PROFILE_FILE_NAME);
            if !profile_path.is_file() {
                continue;
            }

            match Self::from_profile_file(&profile_path) {
                Ok(Some(root)) => return Ok(root),
                Ok(None) => {}
                Err(e) => last_parse_error = Some((profile_path, e.to_string())),
            }
        }

        if let Ok(directory) = env::var(ROOT_ENV_VAR) {
            let profile_path = Path::new(&directory).join(PROFILE_FILE_NAME);
            match Self::from_profile_file(&profile_path) {
                Ok(Some(root)) => return Ok(root),
                Ok(None) => {}
                Err(e) => last_parse_error = Some((profile_path, e.to_string())),
            }
        }

        Err(ProfileError::RootNotFound {
            start: start.to_path_buf(),
            last_parse_error,
        })
    }

    /// Load a profile file, returning `None` if it lacks the root marker
    pub fn from_profile_file(profile_path: &Path) -> ProfileResult<Option<Self>> {
        let entries = parse_json_file(profile_path)?;

        let is_root = entries
            .iter()
            .any(|e| e.keyword() == ROOT_MARKER_KEYWORD && e.value() == ROOT_MARKER_VALUE);

        if !is_root {
            log::debug!("{} has no root marker", profile_path.display());
            return Ok(None);
        }

        let directory = profile_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        log::debug!("WebDash root found: {}", directory.display());
        Ok(Some(Root::new(directory, entries)))
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entries under the `path-add` root key, in profile order
    pub fn path_additions(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.root_key() == "path-add")
            .map(|e| e.value().to_string())
            .collect()
    }

    /// `env.<NAME>` entries as `(NAME, value)` pairs
    pub fn environment_additions(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter(|e| e.root_key() == "env")
            .filter_map(|e| {
                let name = e.suffix_key(1);
                if name.is_empty() {
                    None
                } else {
                    Some((name, e.value().to_string()))
                }
            })
            .collect()
    }

    /// Projects described by `pull-projects[i].{source,destination,exec,register}`
    pub fn external_projects(&self) -> Vec<ExternalProject> {
        let mut projects: BTreeMap<usize, ExternalProject> = BTreeMap::new();

        for entry in self.entries.iter().filter(|e| e.root_key() == "pull-projects") {
            let [_, index, property] = entry.tokens() else {
                continue;
            };
            let Some(index) = index
                .strip_prefix('[')
                .and_then(|i| i.strip_suffix(']'))
                .and_then(|i| i.parse::<usize>().ok())
            else {
                continue;
            };

            let project = projects.entry(index).or_default();
            let value = entry.value().to_string();

            match property.as_str() {
                "source" => project.source = value,
                "destination" => project.destination = value,
                "exec" => project.exec = value,
                "register" => project.register = value == "true",
                other => log::debug!("Unknown pull-projects property: {}", other),
            }
        }

        projects.into_values().collect()
    }

    /// Persistent per-application storage, created on demand
    pub fn storage_dir(&self) -> ProfileResult<PathBuf> {
        let path = self.directory.join("app-persistent").join("data").join(APP_NAME);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Per-application log directory, created on demand
    pub fn log_dir(&self) -> ProfileResult<PathBuf> {
        let path = self.directory.join("app-temporary").join("logging").join(APP_NAME);
        fs::create_dir_all(&path)?;
        Ok(path)
    }
}

impl RootProvider for Root {
    fn root_directory(&self) -> &Path {
        &self.directory
    }

    fn profile_substitutions(&self) -> Vec<Substitution> {
        self.entries.iter().map(Entry::to_substitution).collect()
    }

    fn primary_substitutions(&self) -> Vec<Substitution> {
        vec![Substitution::new(
            ROOT_DIR_KEYWORD,
            self.directory.to_string_lossy(),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PROFILE: &str = r#"{
        "myworld": { "rootDir": "this" },
        "path-add": ["$.rootDir()/bin", "/opt/tools"],
        "env": { "EDITOR": "vim", "TOOLS": "$.rootDir()/tools" },
        "pull-projects": [
            { "source": "git@h:a.git", "destination": "$.rootDir()/a", "exec": ":setup", "register": true },
            { "source": "git@h:b.git", "destination": "/b", "exec": ":all" }
        ]
    }"#;

    fn write_profile(dir: &Path, content: &str) {
        fs::write(dir.join(PROFILE_FILE_NAME), content).unwrap();
    }

    #[test]
    fn test_discover_in_ancestor() {
        let temp_dir = TempDir::new().unwrap();
        write_profile(temp_dir.path(), PROFILE);
        let nested = temp_dir.path().join("x").join("y");
        fs::create_dir_all(&nested).unwrap();

        let root = Root::discover(&nested).unwrap();
        assert_eq!(root.root_directory(), temp_dir.path());
    }

    #[test]
    fn test_profile_without_marker_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        write_profile(temp_dir.path(), r#"{ "myworld": { "rootDir": "that" } }"#);

        let result = Root::from_profile_file(&temp_dir.path().join(PROFILE_FILE_NAME)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_nearest_marked_profile_wins_over_unmarked() {
        let temp_dir = TempDir::new().unwrap();
        write_profile(temp_dir.path(), PROFILE);
        let inner = temp_dir.path().join("inner");
        fs::create_dir(&inner).unwrap();
        write_profile(&inner, r#"{ "unrelated": true }"#);

        let root = Root::discover(&inner).unwrap();
        assert_eq!(root.root_directory(), temp_dir.path());
    }

    #[test]
    fn test_parse_failure_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        write_profile(temp_dir.path(), "{ broken");

        let result = Root::from_profile_file(&temp_dir.path().join(PROFILE_FILE_NAME));
        assert!(matches!(result, Err(ProfileError::Json(_))));
    }

    #[test]
    fn test_primary_substitutions_applied_to_profile_values() {
        let temp_dir = TempDir::new().unwrap();
        write_profile(temp_dir.path(), PROFILE);
        let root = Root::from_profile_file(&temp_dir.path().join(PROFILE_FILE_NAME))
            .unwrap()
            .unwrap();
        let root_dir = temp_dir.path().display().to_string();

        assert_eq!(
            root.path_additions(),
            vec![format!("{}/bin", root_dir), "/opt/tools".to_string()]
        );
    }

    #[test]
    fn test_environment_additions() {
        let root = Root::new(
            "/w",
            vec![
                Entry::new(vec!["env".into(), "EDITOR".into()], "vim"),
                Entry::new(vec!["env".into(), "TOOLS".into()], "$.rootDir()/tools"),
                Entry::new(vec!["other".into()], "x"),
            ],
        );

        assert_eq!(
            root.environment_additions(),
            vec![
                ("EDITOR".to_string(), "vim".to_string()),
                ("TOOLS".to_string(), "/w/tools".to_string()),
            ]
        );
    }

    #[test]
    fn test_external_projects() {
        let temp_dir = TempDir::new().unwrap();
        write_profile(temp_dir.path(), PROFILE);
        let root = Root::from_profile_file(&temp_dir.path().join(PROFILE_FILE_NAME))
            .unwrap()
            .unwrap();

        let projects = root.external_projects();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].source, "git@h:a.git");
        assert_eq!(projects[0].destination, format!("{}/a", temp_dir.path().display()));
        assert_eq!(projects[0].exec, ":setup");
        assert!(projects[0].register);
        assert!(!projects[1].register);
    }

    #[test]
    fn test_substitutions() {
        let root = Root::new("/w", vec![Entry::new(vec!["tools".into(), "cc".into()], "gcc")]);

        assert_eq!(
            root.profile_substitutions(),
            vec![Substitution::new("$#.tools.cc", "gcc")]
        );
        assert_eq!(
            root.primary_substitutions(),
            vec![Substitution::new("$.rootDir()", "/w")]
        );
    }

    #[test]
    fn test_storage_and_log_dirs_are_created() {
        let temp_dir = TempDir::new().unwrap();
        let root = Root::new(temp_dir.path(), Vec::new());

        let storage = root.storage_dir().unwrap();
        let logs = root.log_dir().unwrap();
        assert!(storage.ends_with("app-persistent/data/webdash-client"));
        assert!(logs.ends_with("app-temporary/logging/webdash-client"));
        assert!(storage.is_dir());
        assert!(logs.is_dir());
    }
}
