//! Loaded configuration files
//!
//! A [`Config`] owns the tasks of one `webdash.config.json`. Every textual
//! task field is expanded when the file is loaded, using the profile
//! keywords, the primary keywords, and `$.thisDir()`.

use crate::config::parse::parse_config_file;
use crate::error::{ConfigResult, ExecutionResult};
use crate::profile::RootProvider;
use crate::runner::{RunContext, RunResult, Runtime, Substitution, Task};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Keyword expanded to the directory holding the config file
pub const THIS_DIR_KEYWORD: &str = "$.thisDir()";

/// Task run when no command name is given
pub const DEFAULT_COMMAND: &str = "all";

/// One loaded configuration file and its tasks
#[derive(Clone)]
pub struct Config {
    path: PathBuf,
    tasks: Vec<Task>,
    load_failed: bool,
    root: Arc<dyn RootProvider>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("path", &self.path)
            .field("tasks", &self.tasks)
            .field("load_failed", &self.load_failed)
            .field("root", &self.root.root_directory())
            .finish()
    }
}

impl Config {
    /// Load a config file
    pub fn load(path: &Path, root: Arc<dyn RootProvider>) -> ConfigResult<Self> {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let mut config = Config {
            path,
            tasks: Vec::new(),
            load_failed: true,
            root,
        };
        config.reload()?;

        Ok(config)
    }

    /// Re-read the file, replacing every task
    ///
    /// Runtime state of the previous tasks (last execution time) is lost. When
    /// the file cannot be read or parsed the current tasks are kept and the
    /// config is marked as failed.
    pub fn reload(&mut self) -> ConfigResult<()> {
        let file = match parse_config_file(&self.path) {
            Ok(file) => file,
            Err(e) => {
                self.load_failed = true;
                return Err(e);
            }
        };
        let substitutions = self.substitutions();

        let mut tasks = Vec::with_capacity(file.commands.len());
        for (index, value) in file.commands.iter().enumerate() {
            match Task::from_value(&self.path, index, value, &substitutions) {
                Ok(task) => tasks.push(task),
                Err(e) => log::error!("C| {}: {}. Skipped.", self.path.display(), e),
            }
        }

        self.tasks = tasks;
        self.load_failed = false;
        log::debug!(
            "C| {}: loaded {} task(s).",
            self.path.display(),
            self.tasks.len()
        );

        Ok(())
    }

    pub fn last_loading_succeeded(&self) -> bool {
        !self.load_failed
    }

    /// Canonical path of the config file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the config file
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("/"))
    }

    /// Every substitution applied to task fields, in application order
    pub fn substitutions(&self) -> Vec<Substitution> {
        let mut substitutions = self.root.profile_substitutions();
        substitutions.extend(self.root.primary_substitutions());
        substitutions.push(Substitution::new(
            THIS_DIR_KEYWORD,
            self.directory().to_string_lossy(),
        ));
        substitutions
    }

    /// All tasks, including invalid ones
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Names of the tasks that can be run
    pub fn task_list(&self) -> Vec<String> {
        self.tasks
            .iter()
            .filter(|t| t.is_valid())
            .map(|t| t.name.clone())
            .collect()
    }

    /// A copy of the first valid task named `name`; an empty name means `all`
    pub fn get_task(&self, name: &str) -> Option<Task> {
        find_task(&self.tasks, name)
    }

    /// Run every valid task named `command_name` (or `all` when empty)
    ///
    /// `:name` references resolve against this config as it was when the run
    /// started; anything else goes through the runtime's locator.
    pub fn run(
        &mut self,
        command_name: &str,
        runtime: &Runtime,
    ) -> ExecutionResult<Vec<RunResult>> {
        let command_name = command_or_default(command_name);
        let snapshot = self.tasks.clone();
        let locator = &runtime.locator;

        let resolver = move |reference: &str| -> Option<Task> {
            if let Some(name) = reference.strip_prefix(':') {
                return find_task(&snapshot, name);
            }

            let (config, command) = locator.locate(&[reference.to_string()])?;
            config.get_task(&command)
        };

        let mut ctx = RunContext::new(&resolver, runtime.runner.as_ref(), runtime.notifier.as_ref())
            .with_options(runtime.options);

        let mut results = Vec::new();
        for task in self
            .tasks
            .iter_mut()
            .filter(|t| t.is_valid() && t.name == command_name)
        {
            results.push(task.run(&mut ctx)?);
        }

        Ok(results)
    }
}

fn command_or_default(name: &str) -> &str {
    if name.is_empty() {
        DEFAULT_COMMAND
    } else {
        name
    }
}

fn find_task(tasks: &[Task], name: &str) -> Option<Task> {
    let name = command_or_default(name);
    tasks
        .iter()
        .find(|t| t.is_valid() && t.name == name)
        .cloned()
}
