//! JSON rendering of result trees
//!
//! Property ids expand into nested objects (`Hosts/host_name` becomes
//! `{"Hosts": {"host_name": ..}}`). Collections render as `items` arrays,
//! single instances as the object itself.

use serde_json::{Map, Value};

use super::tree::{ResultRow, ResultTree};
use crate::resource::Resource;
use crate::schema::PATH_SEPARATOR;

/// Renders a top-level result tree
pub fn render_tree(tree: &ResultTree) -> Value {
    if tree.is_collection() {
        let items: Vec<Value> = tree.rows().iter().map(render_row).collect();
        let mut root = Map::new();
        root.insert("items".into(), Value::Array(items));
        Value::Object(root)
    } else {
        tree.rows()
            .first()
            .map(render_row)
            .unwrap_or_else(|| Value::Object(Map::new()))
    }
}

/// Renders a row with its nested sub-resources
pub fn render_row(row: &ResultRow) -> Value {
    let mut object = render_resource(&row.resource);
    for (name, nested) in &row.sub_resources {
        let value = if nested.is_collection() {
            Value::Array(nested.rows().iter().map(render_row).collect())
        } else {
            nested
                .rows()
                .first()
                .map(render_row)
                .unwrap_or(Value::Null)
        };
        object.insert(name.clone(), value);
    }
    Value::Object(object)
}

/// Expands flat property ids into nested objects
pub fn render_resource(resource: &Resource) -> Map<String, Value> {
    let mut object = Map::new();
    for (id, value) in resource.properties() {
        insert_path(&mut object, id.as_str(), value.clone());
    }
    object
}

fn insert_path(object: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once(PATH_SEPARATOR) {
        None => {
            object.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = object
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            // a scalar already sits where a category is expected; keep it
            if let Value::Object(child) = child {
                insert_path(child, rest, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn host(name: &str) -> Resource {
        Resource::new("Host")
            .with_property("Hosts/host_name", name)
            .with_property("metrics/cpu/cpu_user", 1.5)
    }

    #[test]
    fn test_render_resource_nests_categories() {
        let rendered = render_resource(&host("h1"));
        assert_eq!(
            Value::Object(rendered),
            json!({
                "Hosts": {"host_name": "h1"},
                "metrics": {"cpu": {"cpu_user": 1.5}}
            })
        );
    }

    #[test]
    fn test_render_collection() {
        let mut tree = ResultTree::new(true);
        tree.add_row(host("h1"));
        tree.add_row(host("h2"));

        let rendered = render_tree(&tree);
        assert_eq!(rendered["items"].as_array().unwrap().len(), 2);
        assert_eq!(rendered["items"][1]["Hosts"]["host_name"], json!("h2"));
    }

    #[test]
    fn test_render_instance_with_sub_resources() {
        let mut components = ResultTree::new(true);
        components.add_row(Resource::new("HostComponent").with_property("HostRoles/component_name", "DATANODE"));

        let mut tree = ResultTree::new(false);
        let row = tree.add_row(host("h1"));
        row.sub_resources.insert("host_components".into(), components);

        let rendered = render_tree(&tree);
        assert_eq!(rendered["Hosts"]["host_name"], json!("h1"));
        assert_eq!(
            rendered["host_components"],
            json!([{"HostRoles": {"component_name": "DATANODE"}}])
        );
    }

    #[test]
    fn test_render_empty_instance() {
        assert_eq!(render_tree(&ResultTree::new(false)), json!({}));
    }
}
