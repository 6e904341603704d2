//! Resource rows returned by a cluster controller

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

use crate::schema::{PropertyId, ResourceType};

/// A single managed entity with its property values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource type
    #[serde(rename = "type")]
    resource_type: ResourceType,
    /// Property values keyed by property id
    #[serde(default)]
    properties: BTreeMap<PropertyId, Value>,
}

impl Resource {
    /// Creates a resource with no properties
    pub fn new(resource_type: impl Into<ResourceType>) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style property setter
    pub fn with_property(mut self, id: impl Into<PropertyId>, value: impl Into<Value>) -> Self {
        self.set_property(id, value);
        self
    }

    pub fn set_property(&mut self, id: impl Into<PropertyId>, value: impl Into<Value>) {
        self.properties.insert(id.into(), value.into());
    }

    pub fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    /// Returns the value of a property, if present
    pub fn property_value(&self, id: &PropertyId) -> Option<&Value> {
        self.properties.get(id)
    }

    /// Returns a property value rendered as a key string.
    ///
    /// Strings are returned verbatim, other scalars by their JSON rendering.
    /// Null and missing values yield `None`.
    pub fn property_string(&self, id: &PropertyId) -> Option<String> {
        self.property_value(id).and_then(value_as_key)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&PropertyId, &Value)> {
        self.properties.iter()
    }

    /// Returns a copy holding only the properties selected by `ids`.
    ///
    /// An id selects itself and every property beneath it, so `metrics`
    /// keeps `metrics/cpu/cpu_user`.
    pub fn project(&self, ids: &BTreeSet<PropertyId>) -> Resource {
        let properties = self
            .properties
            .iter()
            .filter(|(id, _)| ids.iter().any(|sel| id.is_within(sel.as_str())))
            .map(|(id, value)| (id.clone(), value.clone()))
            .collect();
        Resource {
            resource_type: self.resource_type.clone(),
            properties,
        }
    }
}

impl Hash for Resource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.resource_type.hash(state);
        for (id, value) in &self.properties {
            id.hash(state);
            value.to_string().hash(state);
        }
    }
}

/// Renders a JSON value as a key string
pub fn value_as_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_string() {
        let host = Resource::new("Host")
            .with_property("Hosts/host_name", "h1")
            .with_property("Hosts/cpu_count", 8)
            .with_property("Hosts/rack", Value::Null);

        assert_eq!(host.property_string(&"Hosts/host_name".into()), Some("h1".into()));
        assert_eq!(host.property_string(&"Hosts/cpu_count".into()), Some("8".into()));
        assert_eq!(host.property_string(&"Hosts/rack".into()), None);
        assert_eq!(host.property_string(&"Hosts/missing".into()), None);
    }

    #[test]
    fn test_project_keeps_nested_properties() {
        let host = Resource::new("Host")
            .with_property("Hosts/host_name", "h1")
            .with_property("metrics/cpu/cpu_user", json!(1.5))
            .with_property("metrics/disk/read_bytes", json!(10));

        let ids = BTreeSet::from([
            PropertyId::from("Hosts/host_name"),
            PropertyId::from("metrics/cpu"),
        ]);
        let projected = host.project(&ids);

        assert!(projected.property_value(&"Hosts/host_name".into()).is_some());
        assert!(projected.property_value(&"metrics/cpu/cpu_user".into()).is_some());
        assert!(projected.property_value(&"metrics/disk/read_bytes".into()).is_none());
        assert_eq!(projected.resource_type(), host.resource_type());
    }

    #[test]
    fn test_equal_resources_share_a_set_slot() {
        let a = Resource::new("Host").with_property("Hosts/host_name", "h1");
        let b = Resource::new("Host").with_property("Hosts/host_name", "h1");
        let c = Resource::new("Host").with_property("Hosts/host_name", json!(1));

        let set: std::collections::HashSet<Resource> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
