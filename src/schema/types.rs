//! Resource type identifiers, key bindings and schemas

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::property::PropertyId;

/// Opaque identifier naming a category of managed entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType(String);

impl ResourceType {
    pub fn new(name: impl Into<String>) -> Self {
        ResourceType(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceType {
    fn from(name: &str) -> Self {
        ResourceType(name.to_string())
    }
}

/// Binding of a resource type to one concrete instance, or to none.
///
/// An unbound entry turns the query into a collection query over that type.
/// Serialized as a nullable string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum KeyBinding {
    /// Bound to the instance with this key value
    Bound(String),
    /// Not bound to any instance
    Unbound,
}

impl KeyBinding {
    pub fn bound(value: impl Into<String>) -> Self {
        KeyBinding::Bound(value.into())
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, KeyBinding::Bound(_))
    }

    /// Returns the bound value, if any
    pub fn value(&self) -> Option<&str> {
        match self {
            KeyBinding::Bound(value) => Some(value),
            KeyBinding::Unbound => None,
        }
    }
}

impl From<Option<String>> for KeyBinding {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(value) => KeyBinding::Bound(value),
            None => KeyBinding::Unbound,
        }
    }
}

impl From<KeyBinding> for Option<String> {
    fn from(binding: KeyBinding) -> Self {
        match binding {
            KeyBinding::Bound(value) => Some(value),
            KeyBinding::Unbound => None,
        }
    }
}

/// Ancestor (and own) key bindings of a query
pub type KeyValueMap = BTreeMap<ResourceType, KeyBinding>;

/// Returns true if `map` leaves `resource_type` unbound (or does not mention it)
pub fn is_unbound(map: &KeyValueMap, resource_type: &ResourceType) -> bool {
    !map.get(resource_type).map_or(false, KeyBinding::is_bound)
}

/// Per resource type, the property ids holding the keys of related types.
///
/// The schema of `HostComponent` maps `Host` to `HostRoles/host_name` and
/// `HostComponent` to `HostRoles/component_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Key property per resource type
    #[serde(default, rename = "keys")]
    key_property_ids: BTreeMap<ResourceType, PropertyId>,
}

impl Schema {
    /// Creates a schema from (type, key property) pairs
    pub fn new(keys: impl IntoIterator<Item = (ResourceType, PropertyId)>) -> Self {
        Self {
            key_property_ids: keys.into_iter().collect(),
        }
    }

    /// Adds a key property mapping
    pub fn with_key(mut self, resource_type: impl Into<ResourceType>, id: impl Into<PropertyId>) -> Self {
        self.key_property_ids.insert(resource_type.into(), id.into());
        self
    }

    /// Property id holding the key of `resource_type`, if this schema knows it
    pub fn key_property_id(&self, resource_type: &ResourceType) -> Option<&PropertyId> {
        self.key_property_ids.get(resource_type)
    }

    /// All key property mappings in type order
    pub fn key_property_ids(&self) -> impl Iterator<Item = (&ResourceType, &PropertyId)> {
        self.key_property_ids.iter()
    }

    /// Returns true if `id` is the key property of some type
    pub fn is_key_property(&self, id: &PropertyId) -> bool {
        self.key_property_ids.values().any(|k| k == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_binding_serde_roundtrip_as_nullable() {
        let mut map = KeyValueMap::new();
        map.insert("Cluster".into(), KeyBinding::bound("c1"));
        map.insert("Host".into(), KeyBinding::Unbound);

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({"Cluster": "c1", "Host": null}));

        let back: KeyValueMap = serde_json::from_value(json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_is_unbound() {
        let mut map = KeyValueMap::new();
        map.insert("Cluster".into(), KeyBinding::bound("c1"));
        map.insert("Host".into(), KeyBinding::Unbound);

        assert!(!is_unbound(&map, &"Cluster".into()));
        assert!(is_unbound(&map, &"Host".into()));
        assert!(is_unbound(&map, &"Service".into()));
    }

    #[test]
    fn test_schema_lookup() {
        let schema = Schema::default()
            .with_key("Host", "HostRoles/host_name")
            .with_key("HostComponent", "HostRoles/component_name");

        assert_eq!(
            schema.key_property_id(&"Host".into()),
            Some(&PropertyId::from("HostRoles/host_name"))
        );
        assert_eq!(schema.key_property_id(&"Cluster".into()), None);
        assert!(schema.is_key_property(&"HostRoles/component_name".into()));
        assert!(!schema.is_key_property(&"HostRoles/state".into()));
    }
}
