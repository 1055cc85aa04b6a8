//! Attribute filters over serialized records.
//!
//! Filter keys are dotted paths into a record's JSON form, for example
//! `resource.service_name` or `tags.http.method`. Since attribute names may
//! themselves contain dots, each step first tries the whole remaining path
//! as a single key before splitting.

use crate::models::Resource;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Filter key used for resource selection.
pub const RESOURCE_FILTER_KEY: &str = "resource.key";

/// An active filter as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterEntry {
    /// Dotted path.
    pub key: String,
    /// Expected value.
    pub value: String,
    /// Display name; `resource` for the resource selection.
    pub display: String,
}

/// A set of `path = value` filters. A record matches when the set is empty
/// or when any filter matches.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: BTreeMap<String, String>,
}

impl FilterSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a filter.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.filters.insert(key.into(), value.into());
    }

    /// Removes a filter; missing keys are ignored.
    pub fn remove(&mut self, key: &str) {
        self.filters.remove(key);
    }

    /// Removes every filter.
    pub fn clear(&mut self) {
        self.filters.clear();
    }

    /// Returns true if a filter exists for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.filters.contains_key(key)
    }

    /// Returns true if no filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Selects a resource, or clears the selection with `None`.
    pub fn select_resource(&mut self, resource: Option<&Resource>) {
        match resource {
            Some(resource) => self.add(RESOURCE_FILTER_KEY, resource.key()),
            None => self.remove(RESOURCE_FILTER_KEY),
        }
    }

    /// Key of the selected resource, if any.
    #[must_use]
    pub fn selected_resource_key(&self) -> Option<&str> {
        self.filters.get(RESOURCE_FILTER_KEY).map(String::as_str)
    }

    /// Active filters in key order.
    #[must_use]
    pub fn active(&self) -> Vec<FilterEntry> {
        self.filters
            .iter()
            .map(|(key, value)| FilterEntry {
                key: key.clone(),
                value: value.clone(),
                display: if key == RESOURCE_FILTER_KEY {
                    "resource".to_string()
                } else {
                    key.clone()
                },
            })
            .collect()
    }

    /// Returns true if `record` passes the filters.
    ///
    /// Records that fail to serialize match only an empty set.
    #[must_use]
    pub fn matches<T: Serialize>(&self, record: &T) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        let Ok(value) = serde_json::to_value(record) else {
            return false;
        };
        self.matches_value(&value)
    }

    /// Same as [`matches`](Self::matches) for an already serialized record.
    ///
    /// A filter whose path does not resolve only fails itself; the other
    /// filters of the set can still match the record.
    #[must_use]
    pub fn matches_value(&self, record: &Value) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        self.filters.iter().any(|(path, expected)| {
            resolve(record, path).is_some_and(|found| value_equals(found, expected))
        })
    }
}

fn resolve<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let object = value.as_object()?;
    if let Some(found) = object.get(path) {
        return Some(found);
    }
    let (head, rest) = path.split_once('.')?;
    resolve(object.get(head)?, rest)
}

fn value_equals(found: &Value, expected: &str) -> bool {
    match found {
        Value::String(s) => s == expected,
        Value::Number(n) => n.to_string() == expected,
        Value::Bool(b) => b.to_string() == expected,
        _ => false,
    }
}
