// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Run-wide scratch space modules use to share values that are not containers.
///
/// Unlike the container store, the cache is not scoped by dependencies and is never
/// garbage collected during a run. Typical uses are credentials or lookups computed
/// once by a preflight.
///
/// # Example
/// ```
/// use recipe_engine::utils::Cache;
/// use serde_json::json;
///
/// let cache = Cache::new();
/// cache.set("project", json!("forensics-1"));
/// assert_eq!(cache.get("project"), Some(json!("forensics-1")));
/// assert!(cache.get("missing").is_none());
/// ```
#[derive(Debug, Default)]
pub struct Cache {
    entries: RwLock<HashMap<String, Value>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`, returning the value it replaced.
    pub fn set(&self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_replaces_and_returns_previous() {
        let cache = Cache::new();
        assert_eq!(cache.set("k", json!(1)), None);
        assert_eq!(cache.set("k", json!(2)), Some(json!(1)));
        assert_eq!(cache.get("k"), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_remove() {
        let cache = Cache::new();
        cache.set("k", json!("v"));
        assert!(cache.contains("k"));
        assert_eq!(cache.remove("k"), Some(json!("v")));
        assert!(cache.is_empty());
    }
}
