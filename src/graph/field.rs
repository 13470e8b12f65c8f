//! Text field values carried by entities and edges
//!
//! Federated sources disagree on whether a field such as `images` or `meta`
//! holds one string or a list of strings, so both shapes are accepted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A text field that is either a single string or a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextValue {
    One(String),
    Many(Vec<String>),
}

impl Default for TextValue {
    fn default() -> Self {
        TextValue::One(String::new())
    }
}

impl TextValue {
    /// True when the field holds no non-empty string
    pub fn is_empty(&self) -> bool {
        self.iter().all(|s| s.is_empty())
    }

    /// First non-empty entry
    pub fn first(&self) -> Option<&str> {
        self.iter().find(|s| !s.is_empty())
    }

    /// Iterate over all entries, including empty ones
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            TextValue::One(s) => std::slice::from_ref(s),
            TextValue::Many(v) => v.as_slice(),
        };
        slice.iter().map(String::as_str)
    }

    /// Join all entries with a separator
    pub fn join(&self, sep: &str) -> String {
        match self {
            TextValue::One(s) => s.clone(),
            TextValue::Many(v) => v.join(sep),
        }
    }

    /// Non-empty entries as an owned list
    pub fn to_vec(&self) -> Vec<String> {
        self.iter()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Case-insensitive substring match against any entry
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.iter().any(|s| s.to_lowercase().contains(&needle))
    }
}

impl fmt::Display for TextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextValue::One(s) => write!(f, "{}", s),
            TextValue::Many(v) => write!(f, "[{}]", v.join(", ")),
        }
    }
}

// Convenience conversions
impl From<String> for TextValue {
    fn from(s: String) -> Self {
        TextValue::One(s)
    }
}

impl From<&str> for TextValue {
    fn from(s: &str) -> Self {
        TextValue::One(s.to_string())
    }
}

impl From<Vec<String>> for TextValue {
    fn from(v: Vec<String>) -> Self {
        TextValue::Many(v)
    }
}

impl From<Vec<&str>> for TextValue {
    fn from(v: Vec<&str>) -> Self {
        TextValue::Many(v.into_iter().map(str::to_string).collect())
    }
}
