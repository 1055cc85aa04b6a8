//! Resource registry.
//!
//! Keeps every resource observed during the session, deduplicated by key.
//! The first-seen attributes win; entries are never updated or removed.

use crate::models::Resource;
use std::collections::HashSet;

/// Deduplicating, insertion-ordered registry of resources.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    resources: Vec<Resource>,
    keys: HashSet<String>,
}

impl ResourceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource unless one with the same key is already known.
    ///
    /// Returns `true` if the resource was new.
    pub fn add(&mut self, resource: &Resource) -> bool {
        if self.keys.contains(resource.key()) {
            return false;
        }
        tracing::debug!(key = %resource.key(), "Registered resource");
        self.keys.insert(resource.key().to_string());
        self.resources.push(resource.clone());
        true
    }

    /// Looks up a resource by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Resource> {
        if !self.keys.contains(key) {
            return None;
        }
        self.resources.iter().find(|r| r.key() == key)
    }

    /// All resources in first-seen order.
    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Number of distinct resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns true if no resource has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResourceDto;
    use std::collections::HashMap;

    #[test]
    fn test_add_deduplicates_by_key() {
        let mut registry = ResourceRegistry::new();
        let resource = Resource::new("ns", "api", "1", "i-1");

        assert!(registry.add(&resource));
        assert!(!registry.add(&resource));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_first_seen_attributes_win() {
        let mut registry = ResourceRegistry::new();
        let first = Resource::from(ResourceDto {
            service_name: "api".to_string(),
            attributes: HashMap::from([("host".to_string(), "a".to_string())]),
            ..ResourceDto::default()
        });
        let second = Resource::from(ResourceDto {
            service_name: "api".to_string(),
            attributes: HashMap::from([("host".to_string(), "b".to_string())]),
            ..ResourceDto::default()
        });

        registry.add(&first);
        registry.add(&second);

        let stored = registry.get(first.key()).unwrap();
        assert_eq!(stored.attributes().get("host").unwrap(), "a");
    }

    #[test]
    fn test_resources_keep_insertion_order() {
        let mut registry = ResourceRegistry::new();
        registry.add(&Resource::new("", "b", "", ""));
        registry.add(&Resource::new("", "a", "", ""));

        let names: Vec<_> = registry
            .resources()
            .iter()
            .map(Resource::service_name)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(registry.get("missing").is_none());
    }
}
