//! Execution context for task running
//!
//! The context tracks all the state needed during one top-level run: the
//! run flags, the services tasks call out to, and the stack of tasks being
//! executed.

use crate::config::Locator;
use crate::profile::{LogNotifier, Notifier};
use crate::runner::{Invocation, ProcessRunner, RunResult, SystemRunner, Task};

/// Resolves a dependency or action string to a task, if it names one
pub trait TaskResolver {
    fn resolve(&self, reference: &str) -> Option<Task>;
}

impl<F> TaskResolver for F
where
    F: Fn(&str) -> Option<Task>,
{
    fn resolve(&self, reference: &str) -> Option<Task> {
        self(reference)
    }
}

/// Flags for one top-level run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Refuse tasks that do not declare a `frequency`
    pub run_only_with_frequency: bool,

    /// Collect process output into the run result instead of printing it
    pub capture_output: bool,
}

impl RunOptions {
    pub fn with_frequency_only(mut self, enabled: bool) -> Self {
        self.run_only_with_frequency = enabled;
        self
    }

    pub fn with_capture_output(mut self, enabled: bool) -> Self {
        self.capture_output = enabled;
        self
    }
}

/// One entry of the execution stack
///
/// Tasks sharing a name in one config share an id, so the position in the
/// config's `commands` array tells them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFrame {
    pub id: String,
    pub index: usize,
}

impl TaskFrame {
    pub fn new(id: impl Into<String>, index: usize) -> Self {
        TaskFrame {
            id: id.into(),
            index,
        }
    }
}

/// Execution context that tracks state during task execution
pub struct RunContext<'a> {
    pub options: RunOptions,

    resolver: &'a dyn TaskResolver,
    runner: &'a dyn ProcessRunner,
    notifier: &'a dyn Notifier,

    /// Tasks currently executing, outermost first
    task_stack: Vec<TaskFrame>,
}

impl<'a> RunContext<'a> {
    pub fn new(
        resolver: &'a dyn TaskResolver,
        runner: &'a dyn ProcessRunner,
        notifier: &'a dyn Notifier,
    ) -> Self {
        RunContext {
            options: RunOptions::default(),
            resolver,
            runner,
            notifier,
            task_stack: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Look up a task by reference
    pub fn resolve(&self, reference: &str) -> Option<Task> {
        self.resolver.resolve(reference)
    }

    /// Run a process through the configured runner
    pub fn spawn(&self, invocation: &Invocation<'_>) -> RunResult {
        self.runner.run(invocation)
    }

    pub fn notify(&self, task_id: &str) {
        self.notifier.notify(task_id);
    }

    /// Push a task onto the execution stack
    pub fn push_task(&mut self, frame: TaskFrame) {
        self.task_stack.push(frame);
    }

    /// Pop a task from the execution stack
    pub fn pop_task(&mut self) -> Option<TaskFrame> {
        self.task_stack.pop()
    }

    /// Check if a task is in the execution stack (detect cycles)
    pub fn is_task_in_stack(&self, frame: &TaskFrame) -> bool {
        self.position_in_stack(frame).is_some()
    }

    /// Depth at which a task entered the stack, outermost is 0
    pub fn position_in_stack(&self, frame: &TaskFrame) -> Option<usize> {
        self.task_stack.iter().position(|f| f == frame)
    }

    /// Get the current task (top of stack)
    pub fn current_task(&self) -> Option<&TaskFrame> {
        self.task_stack.last()
    }

    pub fn task_stack(&self) -> &[TaskFrame] {
        &self.task_stack
    }

    /// Get all task ids in the stack
    pub fn task_ids(&self) -> Vec<&str> {
        self.task_stack.iter().map(|f| f.id.as_str()).collect()
    }
}

/// Services shared by every run started from the command line
pub struct Runtime {
    /// Resolves references that point into other configs
    pub locator: Locator,

    pub runner: Box<dyn ProcessRunner>,

    pub notifier: Box<dyn Notifier>,

    pub options: RunOptions,
}

impl Runtime {
    /// Create a runtime spawning real processes and logging notifications
    pub fn new(locator: Locator) -> Self {
        Runtime {
            locator,
            runner: Box::new(SystemRunner::new()),
            notifier: Box::new(LogNotifier),
            options: RunOptions::default(),
        }
    }

    pub fn with_runner(mut self, runner: impl ProcessRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }
}
