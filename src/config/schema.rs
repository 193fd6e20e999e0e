//! Task definition validation
//!
//! A definition without a name cannot be addressed and is dropped by the
//! loader. A definition without actions is kept but marked invalid, so it
//! shows up in neither task listings nor runs.

use crate::config::types::TaskDefinition;
use crate::error::{ConfigError, ConfigResult};

/// The task's name, required for it to be loaded at all
pub fn task_name(definition: &TaskDefinition, index: usize) -> ConfigResult<String> {
    definition
        .name
        .clone()
        .ok_or(ConfigError::MissingName { index })
}

/// Whether a definition provides `action` or `actions`
pub fn has_actions(definition: &TaskDefinition) -> bool {
    definition.action.is_some() || definition.actions.is_some()
}

/// All actions in execution order: `action` first, then `actions`
pub fn task_actions(definition: &TaskDefinition) -> Vec<String> {
    definition
        .action
        .iter()
        .chain(definition.actions.iter().flatten())
        .cloned()
        .collect()
}

/// Validate a named task definition
pub fn validate_task(task_id: &str, definition: &TaskDefinition) -> ConfigResult<()> {
    if !has_actions(definition) {
        return Err(ConfigError::MissingActions(task_id.to_string()));
    }

    Ok(())
}

/// Log optional fields a definition leaves out
pub fn report_missing_optionals(task_id: &str, definition: &TaskDefinition) {
    if definition.dependencies.is_none() {
        log::warn!("T| {}: field missing [dependencies].", task_id);
    }
    if definition.frequency.is_none() {
        log::debug!("T| {}: field missing [frequency].", task_id);
    }
    if definition.when.is_none() {
        log::debug!("T| {}: field missing [when].", task_id);
    }
    if definition.wdir.is_none() {
        log::debug!("T| {}: no working directory (wdir) given.", task_id);
    }
    if definition.notify_dashboard.is_none() {
        log::debug!("T| {}: dashboard notification not specified.", task_id);
    }
}
