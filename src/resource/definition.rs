//! Static resource metadata
//!
//! The catalog is an immutable adjacency structure: each resource type maps
//! to its definition, and each definition lists the sub-resource types
//! nested beneath it. Queries only ever read it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::schema::ResourceType;

/// A resource type nested beneath another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubResourceDefinition {
    /// Target resource type
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// Exposed under the plural name when true, the singular name otherwise
    #[serde(default = "default_is_collection")]
    pub is_collection: bool,
    /// Foreign keys requested on every sub-resource row beyond the parent key
    #[serde(default)]
    pub additional_foreign_keys: Vec<ResourceType>,
}

fn default_is_collection() -> bool {
    true
}

impl SubResourceDefinition {
    /// Creates a collection sub-resource definition
    pub fn collection(resource_type: impl Into<ResourceType>) -> Self {
        Self {
            resource_type: resource_type.into(),
            is_collection: true,
            additional_foreign_keys: Vec::new(),
        }
    }

    /// Creates a singular sub-resource definition
    pub fn singular(resource_type: impl Into<ResourceType>) -> Self {
        Self {
            resource_type: resource_type.into(),
            is_collection: false,
            additional_foreign_keys: Vec::new(),
        }
    }

    /// Adds an additional foreign key type
    pub fn with_foreign_key(mut self, resource_type: impl Into<ResourceType>) -> Self {
        self.additional_foreign_keys.push(resource_type.into());
        self
    }
}

/// Definition of a resource type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub singular_name: String,
    pub plural_name: String,
    #[serde(default)]
    pub sub_resources: Vec<SubResourceDefinition>,
}

impl ResourceDefinition {
    pub fn new(
        resource_type: impl Into<ResourceType>,
        singular_name: impl Into<String>,
        plural_name: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            singular_name: singular_name.into(),
            plural_name: plural_name.into(),
            sub_resources: Vec::new(),
        }
    }

    pub fn with_sub_resource(mut self, sub: SubResourceDefinition) -> Self {
        self.sub_resources.push(sub);
        self
    }

    /// Name under which this type is exposed by a parent
    pub fn exposed_name(&self, is_collection: bool) -> &str {
        if is_collection {
            &self.plural_name
        } else {
            &self.singular_name
        }
    }
}

/// All known resource definitions, keyed by type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ResourceDefinition>", into = "Vec<ResourceDefinition>")]
pub struct ResourceCatalog {
    definitions: BTreeMap<ResourceType, ResourceDefinition>,
}

impl ResourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition, replacing any previous one for the same type
    pub fn register(&mut self, definition: ResourceDefinition) {
        self.definitions
            .insert(definition.resource_type.clone(), definition);
    }

    pub fn with_definition(mut self, definition: ResourceDefinition) -> Self {
        self.register(definition);
        self
    }

    pub fn definition(&self, resource_type: &ResourceType) -> Option<&ResourceDefinition> {
        self.definitions.get(resource_type)
    }

    /// Looks a definition up by its plural or singular name
    pub fn definition_by_name(&self, name: &str) -> Option<&ResourceDefinition> {
        self.definitions
            .values()
            .find(|d| d.plural_name == name || d.singular_name == name || d.resource_type.as_str() == name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl From<Vec<ResourceDefinition>> for ResourceCatalog {
    fn from(definitions: Vec<ResourceDefinition>) -> Self {
        let mut catalog = ResourceCatalog::new();
        for definition in definitions {
            catalog.register(definition);
        }
        catalog
    }
}

impl From<ResourceCatalog> for Vec<ResourceDefinition> {
    fn from(catalog: ResourceCatalog) -> Self {
        catalog.definitions.into_values().collect()
    }
}
