//! Terminal output
//!
//! Everything printed for the user (as opposed to logged) goes through here.

use crate::runner::Substitution;
use colored::Colorize;
use std::path::Path;

const GROUP_INDENT: usize = 4;
const ITEM_INDENT: usize = 8;

/// Banner printed before a task action spawns its process
pub fn print_execution_banner(task_id: &str, cwd: &Path, argv: &[String]) {
    println!("{}", format_execution_banner(task_id, cwd, argv).yellow());
}

pub fn format_execution_banner(task_id: &str, cwd: &Path, argv: &[String]) -> String {
    let quoted: Vec<String> = argv.iter().map(|a| format!("'{}'", a)).collect();
    format!(
        "[{}]\n    cwd: {}\n    run: {}",
        task_id,
        cwd.display(),
        quoted.join(" ")
    )
}

/// Print the runnable tasks of a config
pub fn print_task_list(config_path: &Path, tasks: &[String]) {
    println!(
        "{}",
        format!("Tasks in {}:", config_path.display()).bold()
    );
    for task in tasks {
        println!("{:indent$}{}", "", task.green(), indent = GROUP_INDENT);
    }
}

/// Lay out substitution pairs in two left-aligned columns
pub fn format_definitions(substitutions: &[Substitution]) -> String {
    let left = substitutions
        .iter()
        .map(|s| s.pattern.len() + 3)
        .fold(3, usize::max);

    substitutions
        .iter()
        .map(|s| format!("{:<width$}{}\n", s.pattern, s.replacement, width = left))
        .collect()
}

pub fn print_definitions(substitutions: &[Substitution]) {
    print!("{}", format_definitions(substitutions));
}

/// Help shown when the arguments matched no config or command
pub fn format_no_match(config: Option<(&Path, &[String])>, native_commands: &[&str]) -> String {
    let mut out = String::from("No matching config/command found! Please select one of the following:\n");

    if let Some((path, tasks)) = config {
        out.push_str(&format!(
            "\n{:indent$}From the selected WebDash config at '{}':\n",
            "",
            path.display(),
            indent = GROUP_INDENT
        ));
        for task in tasks {
            out.push_str(&format!("{:indent$}{}\n", "", task, indent = ITEM_INDENT));
        }
    }

    out.push_str(&format!(
        "\n{:indent$}WebDash's list of native commands:\n",
        "",
        indent = GROUP_INDENT
    ));
    for command in native_commands {
        out.push_str(&format!("{:indent$}{}\n", "", command, indent = ITEM_INDENT));
    }

    out
}

pub fn print_no_match(config: Option<(&Path, &[String])>, native_commands: &[&str]) {
    print!("{}", format_no_match(config, native_commands));
}

/// Print output collected with `--capture`
pub fn print_captured(output: &str) {
    if output.is_empty() {
        return;
    }
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
}
