//! Core configuration types
//!
//! This module defines the data structures that represent a
//! `webdash.config.json` file.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConfigFile {
    /// Task definitions, kept raw so one malformed entry does not fail the file
    pub commands: Vec<Value>,
}

/// A task definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaskDefinition {
    /// Task name, referenced from the command line and other tasks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// A single action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    /// Several actions, run in order after `action`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_list"
    )]
    pub actions: Option<Vec<String>>,

    /// Task references to run before the actions
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_list"
    )]
    pub dependencies: Option<Vec<String>>,

    /// `"daily"` or a number of milliseconds between runs
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_frequency"
    )]
    pub frequency: Option<String>,

    /// Extra scheduling condition, e.g. `"new-day"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,

    /// Working directory for spawned actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wdir: Option<String>,

    /// Keep going after a failing dependency or action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_on_error: Option<bool>,

    /// Report each run to the dashboard
    #[serde(
        rename = "notify-dashboard",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub notify_dashboard: Option<bool>,

    /// Allow running this task from a config found in a descendant directory
    #[serde(
        rename = "allow-execution-as-ancestor",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub allow_execution_as_ancestor: Option<bool>,
}

impl TaskDefinition {
    /// Parse one element of the `commands` array
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        TaskDefinition::deserialize(value)
    }
}

/// Custom deserializer for lists that handles both single values and arrays
fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let value = Value::deserialize(deserializer)?;

    match value {
        // Single string
        Value::String(s) => Ok(Some(vec![s])),
        // Array of strings
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(D::Error::custom(format!(
                    "expected a string list entry, found {}",
                    other
                ))),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        // Null or not present
        Value::Null => Ok(None),
        _ => Err(D::Error::custom("expected a string or an array of strings")),
    }
}

/// Custom deserializer for frequencies written either as `"500"` or `500`
fn deserialize_frequency<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Null => Ok(None),
        _ => Err(D::Error::custom("frequency must be a string or a number")),
    }
}
