//! Untyped LookML document tree.
//!
//! The parser produces a [`Node`] tree rather than typed structs so that
//! includes can be merged and constants substituted before anything is
//! interpreted. Typed model values are decoded from the tree afterwards.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `@{constant_name}` references inside string values.
static CONSTANT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\{([^}]+)\}").unwrap());

/// A node of a parsed LookML document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Ordered key/value pairs. Keys are unique.
    Mapping(Vec<(String, Node)>),
    /// Ordered list of nodes.
    Sequence(Vec<Node>),
    /// Every leaf value is kept as its source text.
    Scalar(String),
}

impl Node {
    /// An empty mapping.
    pub fn mapping() -> Self {
        Node::Mapping(Vec::new())
    }

    /// Look up a key in a mapping node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Mapping(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Insert or replace a key in a mapping node. No-op on other variants.
    pub fn insert(&mut self, key: impl Into<String>, value: Node) {
        if let Node::Mapping(entries) = self {
            let key = key.into();
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some((_, existing)) => *existing = value,
                None => entries.push((key, value)),
            }
        }
    }

    /// Append to the sequence stored under `key`, creating it if needed.
    pub fn push_to(&mut self, key: &str, value: Node) {
        self.extend_sequence(key, vec![value]);
    }

    /// Append items to the sequence stored under `key`, creating it if needed.
    pub fn extend_sequence(&mut self, key: &str, items: Vec<Node>) {
        if let Node::Mapping(entries) = self {
            match entries.iter_mut().find(|(k, _)| k == key) {
                Some((_, Node::Sequence(existing))) => existing.extend(items),
                Some((_, other)) => *other = Node::Sequence(items),
                None => entries.push((key.to_string(), Node::Sequence(items))),
            }
        }
    }

    /// Replace `@{name}` tokens in every scalar leaf.
    ///
    /// Unknown names are left untouched. The walk is structural: mapping keys
    /// are never rewritten.
    pub fn substitute(&self, constants: &HashMap<String, String>) -> Node {
        match self {
            Node::Mapping(entries) => Node::Mapping(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.substitute(constants)))
                    .collect(),
            ),
            Node::Sequence(items) => {
                Node::Sequence(items.iter().map(|item| item.substitute(constants)).collect())
            }
            Node::Scalar(s) => Node::Scalar(substitute_str(s, constants)),
        }
    }

    /// Convert to a JSON value so typed structs can be decoded with serde.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Node::Mapping(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Node::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Node::to_json).collect())
            }
            Node::Scalar(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// Replace `@{name}` tokens in a single string.
pub fn substitute_str(s: &str, constants: &HashMap<String, String>) -> String {
    if !s.contains("@{") {
        return s.to_string();
    }
    CONSTANT_PATTERN
        .replace_all(s, |caps: &Captures<'_>| match constants.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Names referenced through `@{name}` in a string, in order of appearance.
pub fn constant_references(s: &str) -> Vec<String> {
    CONSTANT_PATTERN
        .captures_iter(s)
        .map(|caps| caps[1].to_string())
        .collect()
}
