//! Resource model: the identity of the process that emitted a record.

use crate::identity::resource_key;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of instance-id characters shown in resource labels.
pub const INSTANCE_PREFIX_LEN: usize = 8;

/// A resource as delivered on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDto {
    /// `service.name`.
    #[serde(default)]
    pub service_name: String,
    /// `service.version`.
    #[serde(default)]
    pub service_version: String,
    /// `service.namespace`.
    #[serde(default)]
    pub service_namespace: String,
    /// `service.instance.id`.
    #[serde(default)]
    pub service_instance_id: String,
    /// Every other resource attribute.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// An immutable resource with its derived identity key.
///
/// # Example
///
/// ```
/// use shared::models::Resource;
///
/// let resource = Resource::new("shop", "checkout", "1.2.0", "0f3a9c2e-77");
/// assert_eq!(resource.key(), "shop|checkout|1.2.0|0f3a9c2e-77");
/// assert_eq!(resource.label(), "checkout (0f3a9c2e)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    service_name: String,
    service_version: String,
    service_namespace: String,
    service_instance_id: String,
    attributes: HashMap<String, String>,
    key: String,
}

impl Resource {
    /// Creates a resource without extra attributes.
    #[must_use]
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        instance_id: impl Into<String>,
    ) -> Self {
        Self::from(ResourceDto {
            service_name: name.into(),
            service_version: version.into(),
            service_namespace: namespace.into(),
            service_instance_id: instance_id.into(),
            attributes: HashMap::new(),
        })
    }

    /// The deduplication key `namespace|name|version|instance`.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// `service.name`.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// `service.version`.
    #[must_use]
    pub fn service_version(&self) -> &str {
        &self.service_version
    }

    /// `service.namespace`.
    #[must_use]
    pub fn service_namespace(&self) -> &str {
        &self.service_namespace
    }

    /// `service.instance.id`.
    #[must_use]
    pub fn service_instance_id(&self) -> &str {
        &self.service_instance_id
    }

    /// Additional resource attributes.
    #[must_use]
    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// Display label: service name plus a short instance-id prefix.
    #[must_use]
    pub fn label(&self) -> String {
        let prefix: String = self
            .service_instance_id
            .chars()
            .take(INSTANCE_PREFIX_LEN)
            .collect();
        format!("{} ({prefix})", self.service_name)
    }
}

impl From<ResourceDto> for Resource {
    fn from(dto: ResourceDto) -> Self {
        let key = resource_key(
            &dto.service_namespace,
            &dto.service_name,
            &dto.service_version,
            &dto.service_instance_id,
        );
        Self {
            service_name: dto.service_name,
            service_version: dto.service_version,
            service_namespace: dto.service_namespace,
            service_instance_id: dto.service_instance_id,
            attributes: dto.attributes,
            key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_from_dto_derives_key() {
        let dto: ResourceDto = serde_json::from_str(
            r#"{
                "service_name": "api",
                "service_version": "2.0",
                "service_namespace": "prod",
                "service_instance_id": "abc",
                "attributes": {"host.name": "node-1"}
            }"#,
        )
        .unwrap();

        let resource = Resource::from(dto);

        assert_eq!(resource.key(), "prod|api|2.0|abc");
        assert_eq!(resource.attributes().get("host.name").unwrap(), "node-1");
    }

    #[test]
    fn test_resource_dto_defaults_missing_fields() {
        let dto: ResourceDto = serde_json::from_str(r#"{"service_name": "api"}"#).unwrap();
        assert_eq!(Resource::from(dto).key(), "|api||");
    }

    #[test]
    fn test_label_truncates_instance_id() {
        let resource = Resource::new("", "svc", "", "123456789abc");
        assert_eq!(resource.label(), "svc (12345678)");

        let short = Resource::new("", "svc", "", "ab");
        assert_eq!(short.label(), "svc (ab)");
    }

    #[test]
    fn test_resource_serializes_key() {
        let resource = Resource::new("ns", "svc", "1", "i");
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["key"], "ns|svc|1|i");
        assert_eq!(json["service_name"], "svc");
    }
}
