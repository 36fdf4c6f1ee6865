//! Attribute values and bags attached to emitted actions
//!
//! An attribute bag is built fresh for every emitted action. Caller-defined
//! attributes can be scoped to a subset of actions with an [`ActionFilter`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute bag: attribute name to value, sorted for stable output
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A single attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Integer view; floats are truncated
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(v) => Some(*v),
            AttributeValue::Float(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(v) => Some(*v as f64),
            AttributeValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Int(v as i64)
    }
}

impl From<u32> for AttributeValue {
    fn from(v: u32) -> Self {
        AttributeValue::Int(v as i64)
    }
}

impl From<u64> for AttributeValue {
    fn from(v: u64) -> Self {
        AttributeValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::String(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::String(v)
    }
}

/// One pattern of an action filter
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    Any,
    Exact(String),
    Prefix(String),
}

/// Selects the actions an attribute applies to
///
/// A filter is a `|`-separated list of patterns. Each pattern is either an
/// exact action name or a prefix terminated by `*`; a lone `*` matches every
/// action.
///
/// # Example
/// ```
/// use videotracker_core::event::attributes::ActionFilter;
///
/// let filter = ActionFilter::parse("CONTENT_*|AD_END");
/// assert!(filter.matches("CONTENT_START"));
/// assert!(filter.matches("AD_END"));
/// assert!(!filter.matches("AD_START"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFilter {
    patterns: Vec<Pattern>,
}

impl ActionFilter {
    /// Parse a filter expression; empty patterns are ignored
    pub fn parse(expr: &str) -> Self {
        let patterns = expr
            .split('|')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| match p.strip_suffix('*') {
                Some("") => Pattern::Any,
                Some(prefix) => Pattern::Prefix(prefix.to_string()),
                None => Pattern::Exact(p.to_string()),
            })
            .collect();
        Self { patterns }
    }

    /// Filter matching every action
    pub fn any() -> Self {
        Self {
            patterns: vec![Pattern::Any],
        }
    }

    /// Filter matching exactly one action name
    pub fn exact(name: &str) -> Self {
        Self {
            patterns: vec![Pattern::Exact(name.to_string())],
        }
    }

    pub fn matches(&self, action: &str) -> bool {
        self.patterns.iter().any(|p| match p {
            Pattern::Any => true,
            Pattern::Exact(name) => name == action,
            Pattern::Prefix(prefix) => action.starts_with(prefix.as_str()),
        })
    }
}

impl From<&str> for ActionFilter {
    fn from(expr: &str) -> Self {
        Self::parse(expr)
    }
}

/// Caller-defined attributes, optionally scoped by action filter
#[derive(Debug, Clone, Default)]
pub struct CustomAttributes {
    entries: Vec<(String, AttributeValue, ActionFilter)>,
}

impl CustomAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` for actions matching `filter`, replacing an earlier value
    /// registered under the same key and filter
    pub fn set(&mut self, key: &str, value: AttributeValue, filter: ActionFilter) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|(k, _, f)| k == key && *f == filter)
        {
            entry.1 = value;
            return;
        }
        self.entries.push((key.to_string(), value, filter));
    }

    /// Copy every attribute whose filter matches `action` into `attrs`
    pub fn apply(&self, action: &str, attrs: &mut Attributes) {
        for (key, value, filter) in &self.entries {
            if filter.matches(action) {
                attrs.insert(key.clone(), value.clone());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
