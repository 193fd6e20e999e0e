//! Command execution
//!
//! This module handles spawning the external processes behind literal task
//! actions. Actions are split on whitespace; no shell is involved, so quotes,
//! pipes and globs reach the program verbatim.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::RunResult;
use crate::ui;
use std::env;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};

/// Exit code reported when a process could not be run or did not exit normally
pub const FAILED_EXIT_CODE: i32 = -1;

/// One process to spawn on behalf of a task
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    /// Id of the task the action belongs to
    pub task_id: &'a str,

    /// Program followed by its arguments
    pub argv: Vec<String>,

    /// Working directory for the child, if the task sets one
    pub working_dir: Option<&'a Path>,

    /// Collect stdout and stderr instead of inheriting them
    pub capture_output: bool,
}

/// Capability to run a process to completion
pub trait ProcessRunner {
    fn run(&self, invocation: &Invocation<'_>) -> RunResult;
}

/// Split an action into program and arguments
pub fn tokenize(action: &str) -> Vec<String> {
    action.split_whitespace().map(str::to_string).collect()
}

/// Runs processes with `std::process`, blocking until they exit
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner {
    /// Suppress the banner printed before each process
    pub quiet: bool,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn try_run(&self, invocation: &Invocation<'_>) -> ExecutionResult<RunResult> {
        let (program, args) = invocation
            .argv
            .split_first()
            .ok_or(ExecutionError::EmptyCommand)?;
        let command_line = invocation.argv.join(" ");

        let mut command = StdCommand::new(program);
        command.args(args);

        let cwd = match invocation.working_dir {
            Some(dir) => {
                if !dir.is_dir() {
                    return Err(ExecutionError::Spawn {
                        command: command_line,
                        reason: format!("failed to set cwd to: {}", dir.display()),
                    });
                }
                log::debug!("Working directory set to: {}", dir.display());
                command.current_dir(dir);
                dir.to_path_buf()
            }
            None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };

        if !self.quiet {
            ui::print_execution_banner(invocation.task_id, &cwd, &invocation.argv);
        }

        command.stdin(Stdio::inherit());

        let spawn_error = |e: io::Error| ExecutionError::Spawn {
            command: command_line.clone(),
            reason: e.to_string(),
        };

        if !invocation.capture_output {
            command.stdout(Stdio::inherit());
            command.stderr(Stdio::inherit());

            let status = command
                .spawn()
                .and_then(|mut child| child.wait())
                .map_err(spawn_error)?;

            return Ok(RunResult {
                exit_code: status.code().unwrap_or(FAILED_EXIT_CODE),
                output: String::new(),
            });
        }

        // Both streams share one pipe so the captured text keeps the order
        // in which the child wrote it.
        let (mut reader, writer) = os_pipe::pipe().map_err(spawn_error)?;
        let stderr_writer = writer.try_clone().map_err(spawn_error)?;
        command.stdout(writer);
        command.stderr(stderr_writer);

        let mut child = command.spawn().map_err(spawn_error)?;

        // The command still holds the write ends; the reader only sees EOF
        // once every copy is closed.
        drop(command);

        let mut captured = Vec::new();
        let read = reader.read_to_end(&mut captured);
        let status = child.wait().map_err(spawn_error)?;
        read.map_err(spawn_error)?;

        Ok(RunResult {
            exit_code: status.code().unwrap_or(FAILED_EXIT_CODE),
            output: String::from_utf8_lossy(&captured).into_owned(),
        })
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation<'_>) -> RunResult {
        log::debug!("Executing: {}", invocation.task_id);
        log::debug!("    => {}", invocation.argv.join(" "));

        match self.try_run(invocation) {
            Ok(result) => result,
            Err(e) => {
                log::error!("{}: {}", invocation.task_id, e);
                RunResult::failed()
            }
        }
    }
}
