//! Category labels as an ordered set.
//!
//! Plain Vec with a membership check: the set is tiny, and insertion order is
//! what the settings screen renders.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORIES: [&str; 3] = ["Computer Science", "Mathematics", "General"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySet {
    names: Vec<String>,
}

impl Default for CategorySet {
    fn default() -> Self {
        Self {
            names: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Used when a remote snapshot is authoritative; duplicates are kept as-is.
    pub fn from_names(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Trimmed; empty strings and duplicates are silently ignored.
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    /// Removing a category never touches tasks that reference it; such tasks
    /// keep rendering their dangling label.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|n| n != name);
        self.names.len() != before
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn replace_all(&mut self, names: Vec<String>) {
        self.names = names;
    }
}
