//! Task execution types and logic
//!
//! This module contains the runtime representation of tasks and execution logic.

use crate::config::{self, TaskDefinition};
use crate::error::{describe_cycle, ConfigError, ConfigResult, ExecutionError, ExecutionResult};
use crate::runner::{
    apply_substitutions, apply_substitutions_list, tokenize, Invocation, RunContext, RunOptions,
    Schedule, Substitution, TaskFrame, WhenCondition, FAILED_EXIT_CODE,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Outcome of running a task, an action, or a whole tree of them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Bitwise OR of every merged exit code
    pub exit_code: i32,

    /// Captured output in execution order
    pub output: String,
}

impl RunResult {
    /// Result of a process that could not be run
    pub fn failed() -> Self {
        RunResult {
            exit_code: FAILED_EXIT_CODE,
            output: String::new(),
        }
    }

    /// Fold another result into this one
    pub fn merge(&mut self, other: RunResult) {
        self.exit_code |= other.exit_code;
        self.output.push_str(&other.output);
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runtime task representation
///
/// This differs from `config::TaskDefinition` by carrying the expanded
/// fields and the per-instance scheduling state.
#[derive(Debug, Clone)]
pub struct Task {
    /// `<config path>#<name>`
    pub id: String,

    /// Config file this task was loaded from
    pub config_path: PathBuf,

    /// Position in the config's `commands` array
    pub index: usize,

    /// Task name
    pub name: String,

    /// Command lines or task references, in execution order
    pub actions: Vec<String>,

    /// Task references run before the actions
    pub dependencies: Vec<String>,

    pub schedule: Schedule,

    /// Working directory for spawned actions
    pub working_directory: Option<PathBuf>,

    pub continue_on_error: bool,

    pub notify_dashboard: bool,

    pub allow_as_ancestor: bool,

    is_valid: bool,
    last_execution: Option<DateTime<Utc>>,
    skip_logged: bool,
}

impl Task {
    /// Create a task from one raw element of a config's `commands` array
    pub fn from_value(
        config_path: &Path,
        index: usize,
        value: &Value,
        substitutions: &[Substitution],
    ) -> ConfigResult<Self> {
        let definition =
            TaskDefinition::from_value(value).map_err(|e| ConfigError::InvalidDefinition {
                index,
                reason: e.to_string(),
            })?;

        Self::from_definition(config_path, index, definition, substitutions)
    }

    /// Create a task from a parsed definition, expanding every textual field
    pub fn from_definition(
        config_path: &Path,
        index: usize,
        definition: TaskDefinition,
        substitutions: &[Substitution],
    ) -> ConfigResult<Self> {
        let raw_name = config::task_name(&definition, index)?;
        let id = format!("{}#{}", config_path.display(), raw_name);

        config::report_missing_optionals(&id, &definition);
        let is_valid = match config::validate_task(&id, &definition) {
            Ok(()) => true,
            Err(e) => {
                log::error!("T| {}", e);
                false
            }
        };

        let actions = config::task_actions(&definition);
        let working_directory = definition
            .wdir
            .as_deref()
            .map(|wdir| apply_substitutions(wdir, substitutions))
            .transpose()?
            .map(PathBuf::from);

        log::debug!("T| {}: loaded.", id);

        Ok(Task {
            name: apply_substitutions(&raw_name, substitutions)?,
            actions: apply_substitutions_list(&actions, substitutions)?,
            dependencies: apply_substitutions_list(
                definition.dependencies.as_deref().unwrap_or_default(),
                substitutions,
            )?,
            schedule: Schedule {
                frequency: definition.frequency,
                when: definition.when.as_deref().map(WhenCondition::parse),
            },
            working_directory,
            continue_on_error: definition.continue_on_error.unwrap_or(false),
            notify_dashboard: definition.notify_dashboard.unwrap_or(false),
            allow_as_ancestor: definition.allow_execution_as_ancestor.unwrap_or(false),
            config_path: config_path.to_path_buf(),
            index,
            id,
            is_valid,
            last_execution: None,
            skip_logged: false,
        })
    }

    /// Whether the task has actions and may be listed or run
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn last_execution(&self) -> Option<DateTime<Utc>> {
        self.last_execution
    }

    pub fn set_last_execution(&mut self, time: Option<DateTime<Utc>>) {
        self.last_execution = time;
    }

    /// Identity of this task on the execution stack
    pub fn frame(&self) -> TaskFrame {
        TaskFrame::new(self.id.clone(), self.index)
    }

    /// Check the scheduling gate against the current time
    pub fn should_execute_timewise(&self, options: &RunOptions) -> bool {
        self.should_execute_timewise_at(options, Utc::now())
    }

    pub fn should_execute_timewise_at(&self, options: &RunOptions, now: DateTime<Utc>) -> bool {
        crate::runner::should_execute_timewise(&self.schedule, self.last_execution, options, now)
    }

    /// Run dependencies, then actions
    ///
    /// Fails only when the task is re-entered while it is still running.
    /// Process failures are reported through the returned exit code.
    pub fn run(&mut self, ctx: &mut RunContext<'_>) -> ExecutionResult<RunResult> {
        let frame = self.frame();
        if let Some(position) = ctx.position_in_stack(&frame) {
            let ids = ctx.task_ids();
            return Err(ExecutionError::CircularDependency(describe_cycle(
                &ids[position..],
                &self.id,
            )));
        }

        if !self.should_execute_timewise(&ctx.options) {
            if !self.skip_logged {
                log::debug!("T| {}: skipped, scheduling conditions not met.", self.id);
                self.skip_logged = true;
            }
            return Ok(RunResult::default());
        }

        self.skip_logged = false;
        self.last_execution = Some(Utc::now());

        if self.notify_dashboard {
            ctx.notify(&self.id);
        }

        ctx.push_task(frame);
        let result = self.run_steps(ctx);
        ctx.pop_task();

        result
    }

    fn run_steps(&self, ctx: &mut RunContext<'_>) -> ExecutionResult<RunResult> {
        let mut result = RunResult::default();

        for dependency in &self.dependencies {
            let Some(mut task) = ctx.resolve(dependency) else {
                log::debug!("T| {}: dependency '{}' not found.", self.id, dependency);
                continue;
            };

            result.merge(task.run(ctx)?);
            if !result.is_success() && !self.continue_on_error {
                return Ok(result);
            }
        }

        for action in &self.actions {
            let step = match ctx.resolve(action) {
                Some(mut task) => task.run(ctx)?,
                None => self.run_action(ctx, action),
            };

            result.merge(step);
            if !result.is_success() && !self.continue_on_error {
                return Ok(result);
            }
        }

        Ok(result)
    }

    /// Spawn one literal command line for this task
    pub fn run_action(&self, ctx: &RunContext<'_>, action: &str) -> RunResult {
        let invocation = Invocation {
            task_id: &self.id,
            argv: tokenize(action),
            working_dir: self.working_directory.as_deref(),
            capture_output: ctx.options.capture_output,
        };

        ctx.spawn(&invocation)
    }
}
