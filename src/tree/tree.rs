//! Result tree structure
//!
//! Rows are ordinal-indexed in provider order; each row's nested results are
//! keyed by sub-resource name.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::resource::Resource;

/// Metadata key marking whether a node is rendered as a collection
pub const IS_COLLECTION: &str = "isCollection";

/// One resource of a result plus its nested sub-resource results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub resource: Resource,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sub_resources: BTreeMap<String, ResultTree>,
}

impl ResultRow {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            sub_resources: BTreeMap::new(),
        }
    }

    /// Nested result for a sub-resource
    pub fn sub_resource(&self, name: &str) -> Option<&ResultTree> {
        self.sub_resources.get(name)
    }
}

/// Ordered tree of resources with string metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultTree {
    /// Whether the query that produced this tree denotes a collection
    collection: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, String>,
    rows: Vec<ResultRow>,
}

impl ResultTree {
    pub fn new(collection: bool) -> Self {
        Self {
            collection,
            properties: BTreeMap::new(),
            rows: Vec::new(),
        }
    }

    /// Whether the producing query left its own key unbound
    pub fn is_collection(&self) -> bool {
        self.collection
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Appends a row and returns it for attaching sub-resources
    pub fn add_row(&mut self, resource: Resource) -> &mut ResultRow {
        self.rows.push(ResultRow::new(resource));
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resources of this level in row order
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.rows.iter().map(|row| &row.resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_keep_insertion_order() {
        let mut tree = ResultTree::new(true);
        tree.add_row(Resource::new("Host").with_property("Hosts/host_name", "h2"));
        tree.add_row(Resource::new("Host").with_property("Hosts/host_name", "h1"));

        let names: Vec<String> = tree
            .resources()
            .filter_map(|r| r.property_string(&"Hosts/host_name".into()))
            .collect();
        assert_eq!(names, vec!["h2", "h1"]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_sub_resources_by_name() {
        let mut tree = ResultTree::new(false);
        let row = tree.add_row(Resource::new("Host"));

        let mut components = ResultTree::new(true);
        components.set_property(IS_COLLECTION, "false");
        components.add_row(Resource::new("HostComponent"));
        row.sub_resources.insert("host_components".into(), components);

        let nested = tree.rows()[0].sub_resource("host_components").unwrap();
        assert_eq!(nested.len(), 1);
        assert!(nested.is_collection());
        assert_eq!(nested.property(IS_COLLECTION), Some("false"));
        assert!(tree.rows()[0].sub_resource("services").is_none());
    }
}
