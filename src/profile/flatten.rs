//! Flattening of JSON documents into key-chain/value entries
//!
//! The profile is an arbitrary JSON document. Every scalar leaf becomes an
//! [`Entry`] whose key chain is the path of object keys and `[i]` array
//! markers leading to it:
//!
//! ```text
//! { "env": { "CC": "gcc" }, "path-add": ["/opt/bin"] }
//!   => ["env", "CC"] = "gcc"
//!      ["path-add", "[0]"] = "/opt/bin"
//! ```
//!
//! Traversal is breadth-first: all leaves of one nesting level are emitted
//! before any leaf of the next level. Object keys within a level come out in
//! sorted order.

use crate::error::{InterpolationResult, ProfileError, ProfileResult};
use crate::runner::{apply_substitutions, Substitution};
use serde_json::Value;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

/// Prefix of every profile-derived substitution keyword
pub const PROFILE_KEY_PREFIX: &str = "$#";

/// One flattened JSON leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    tokens: Vec<String>,
    value: String,
}

impl Entry {
    pub fn new(tokens: Vec<String>, value: impl Into<String>) -> Self {
        Entry {
            tokens,
            value: value.into(),
        }
    }

    /// The key chain leading to this leaf
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// First token of the key chain, or an empty string for a bare scalar
    pub fn root_key(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or("")
    }

    /// Dot-joined key chain, e.g. `myworld.rootDir`
    pub fn key(&self) -> String {
        self.tokens.join(".")
    }

    /// Key chain after dropping the first `skip` tokens, dot-joined
    pub fn suffix_key(&self, skip: usize) -> String {
        self.tokens
            .iter()
            .skip(skip)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Substitution keyword for this leaf, e.g. `$#.myworld.rootDir`
    pub fn keyword(&self) -> String {
        let mut keyword = PROFILE_KEY_PREFIX.to_string();
        for token in &self.tokens {
            keyword.push('.');
            keyword.push_str(token);
        }
        keyword
    }

    /// The keyword → value pair fed into task substitutions
    pub fn to_substitution(&self) -> Substitution {
        Substitution::new(self.keyword(), self.value.clone())
    }

    /// Expand keywords inside the value
    pub fn apply_substitutions_in_value(
        &mut self,
        substitutions: &[Substitution],
    ) -> InterpolationResult<()> {
        self.value = apply_substitutions(&self.value, substitutions)?;
        Ok(())
    }
}

/// String form of a JSON scalar, or `None` for containers and null
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Flatten a JSON document into entries, breadth-first
///
/// The document itself must be an object or an array. `null` leaves carry no
/// value and are skipped.
pub fn flatten(document: &Value) -> ProfileResult<Vec<Entry>> {
    let mut entries = Vec::new();
    let mut queue: VecDeque<(Vec<String>, &Value)> = VecDeque::new();
    queue.push_back((Vec::new(), document));

    while let Some((chain, node)) = queue.pop_front() {
        let children: Vec<(String, &Value)> = match node {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| (format!("[{}]", i), item))
                .collect(),
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            other => return Err(ProfileError::NotExpandable(kind_of(other))),
        };

        for (token, child) in children {
            let mut child_chain = chain.clone();
            child_chain.push(token);

            if is_container(child) {
                queue.push_back((child_chain, child));
            } else if let Some(value) = scalar_to_string(child) {
                entries.push(Entry::new(child_chain, value));
            } else {
                log::debug!("Skipping null profile entry: {}", child_chain.join("."));
            }
        }
    }

    Ok(entries)
}

/// Read and flatten a JSON file
pub fn parse_json_file(path: &Path) -> ProfileResult<Vec<Entry>> {
    let contents = fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&contents)?;
    flatten(&document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lookup<'a>(entries: &'a [Entry], key: &str) -> Option<&'a str> {
        entries.iter().find(|e| e.key() == key).map(Entry::value)
    }

    #[test]
    fn test_flatten_scalars() {
        let doc = json!({ "name": "w", "debug": true, "off": false, "port": 8080, "ratio": 1.5 });
        let entries = flatten(&doc).unwrap();

        assert_eq!(entries.len(), 5);
        assert_eq!(lookup(&entries, "name"), Some("w"));
        assert_eq!(lookup(&entries, "debug"), Some("true"));
        assert_eq!(lookup(&entries, "off"), Some("false"));
        assert_eq!(lookup(&entries, "port"), Some("8080"));
        assert_eq!(lookup(&entries, "ratio"), Some("1.5"));
    }

    #[test]
    fn test_flatten_arrays_use_index_tokens() {
        let doc = json!({ "path-add": ["/a", "/b"] });
        let entries = flatten(&doc).unwrap();

        assert_eq!(entries[0].tokens(), ["path-add", "[0]"]);
        assert_eq!(entries[1].tokens(), ["path-add", "[1]"]);
        assert_eq!(entries[1].value(), "/b");
    }

    #[test]
    fn test_flatten_is_breadth_first() {
        // "a" sorts first but its leaf is deeper than "z".
        let doc = json!({ "a": { "b": { "c": "deep" } }, "z": "shallow", "m": { "n": "mid" } });
        let entries = flatten(&doc).unwrap();
        let keys: Vec<String> = entries.iter().map(Entry::key).collect();

        assert_eq!(keys, vec!["z", "m.n", "a.b.c"]);
    }

    #[test]
    fn test_flatten_reconstructs_leaves() {
        let doc = json!({
            "myworld": { "rootDir": "this" },
            "pull-projects": [
                { "source": "git@x:a.git", "register": true },
                { "source": "git@x:b.git", "register": false }
            ],
            "env": { "CC": "clang", "LEVEL": 3 }
        });
        let entries = flatten(&doc).unwrap();

        for entry in &entries {
            let mut node = &doc;
            for token in entry.tokens() {
                node = if let Some(index) = token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
                    &node[index.parse::<usize>().unwrap()]
                } else {
                    &node[token.as_str()]
                };
            }
            assert_eq!(scalar_to_string(node).as_deref(), Some(entry.value()));
        }
        assert_eq!(entries.len(), 7);
    }

    #[test]
    fn test_flatten_skips_null() {
        let entries = flatten(&json!({ "gone": null, "kept": "x" })).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key(), "kept");
    }

    #[test]
    fn test_flatten_rejects_scalar_document() {
        let result = flatten(&json!("just a string"));
        assert!(matches!(result, Err(ProfileError::NotExpandable("string"))));
    }

    #[test]
    fn test_entry_keyword_and_suffix() {
        let entry = Entry::new(vec!["env".to_string(), "CC".to_string()], "gcc");
        assert_eq!(entry.keyword(), "$#.env.CC");
        assert_eq!(entry.root_key(), "env");
        assert_eq!(entry.suffix_key(1), "CC");
        assert_eq!(
            entry.to_substitution(),
            Substitution::new("$#.env.CC", "gcc")
        );
    }

    #[test]
    fn test_parse_json_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("profile.json");
        fs::write(&path, r#"{ "myworld": { "rootDir": "this" } }"#).unwrap();

        let entries = parse_json_file(&path).unwrap();
        assert_eq!(entries[0].keyword(), "$#.myworld.rootDir");
        assert_eq!(entries[0].value(), "this");
    }

    #[test]
    fn test_parse_json_file_invalid() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("profile.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(parse_json_file(&path), Err(ProfileError::Json(_))));
    }
}
