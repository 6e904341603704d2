//! In-memory cluster controller
//!
//! Serves resources loaded from a [`Fixture`]. Used by the CLI and as the
//! reference controller in tests.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::trace;

use super::controller::ClusterController;
use super::errors::{ControllerError, ControllerResult};
use super::request::Request;
use crate::predicate::{Predicate, PredicateFilter};
use crate::resource::{value_as_key, Resource, ResourceCatalog};
use crate::schema::{PropertyId, ResourceType, Schema};

/// Data for one resource type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeFixture {
    /// Key properties of this type
    #[serde(default)]
    pub schema: Schema,
    /// Properties this type exposes; any property is accepted when absent
    #[serde(default)]
    pub supported_properties: Option<BTreeSet<PropertyId>>,
    /// Rows as flat property maps
    #[serde(default)]
    pub resources: Vec<BTreeMap<PropertyId, Value>>,
}

/// Resource definitions plus per-type data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub definitions: ResourceCatalog,
    #[serde(default)]
    pub types: BTreeMap<ResourceType, TypeFixture>,
}

#[derive(Debug, Default)]
struct TypeData {
    schema: Arc<Schema>,
    supported_properties: Option<BTreeSet<PropertyId>>,
    resources: Vec<Resource>,
}

/// Controller backed by in-memory rows
#[derive(Debug, Default)]
pub struct InMemoryController {
    types: BTreeMap<ResourceType, TypeData>,
}

impl InMemoryController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a controller serving every type of `fixture`
    pub fn from_fixture(fixture: &Fixture) -> Self {
        let mut controller = Self::new();
        for (resource_type, data) in &fixture.types {
            controller.register_type(resource_type.clone(), data.schema.clone());
            if let Some(supported) = &data.supported_properties {
                controller.set_supported_properties(resource_type, supported.clone());
            }
            for row in &data.resources {
                let mut resource = Resource::new(resource_type.clone());
                for (id, value) in row {
                    resource.set_property(id.clone(), value.clone());
                }
                controller.add_resource(resource);
            }
        }
        controller
    }

    /// Registers a type with its schema, keeping existing rows
    pub fn register_type(&mut self, resource_type: ResourceType, schema: Schema) {
        self.types.entry(resource_type).or_default().schema = Arc::new(schema);
    }

    /// Restricts the properties a type exposes
    pub fn set_supported_properties(&mut self, resource_type: &ResourceType, ids: BTreeSet<PropertyId>) {
        self.types
            .entry(resource_type.clone())
            .or_default()
            .supported_properties = Some(ids);
    }

    /// Adds a row; its type is registered on first use
    pub fn add_resource(&mut self, resource: Resource) {
        self.types
            .entry(resource.resource_type().clone())
            .or_default()
            .resources
            .push(resource);
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.add_resource(resource);
        self
    }

    fn type_data(&self, resource_type: &ResourceType) -> ControllerResult<&TypeData> {
        self.types.get(resource_type).ok_or_else(|| {
            ControllerError::SystemFailure(format!("no data for resource type {}", resource_type))
        })
    }

    /// Rejects properties the type does not expose
    fn check_supported(
        &self,
        resource_type: &ResourceType,
        data: &TypeData,
        request: &Request,
        predicate: Option<&Predicate>,
    ) -> ControllerResult<()> {
        let supported = match &data.supported_properties {
            Some(s) => s,
            None => return Ok(()),
        };

        let is_supported = |id: &PropertyId| {
            data.schema.is_key_property(id)
                || supported
                    .iter()
                    .any(|s| s.is_within(id.as_str()) || id.is_within(s.as_str()))
        };

        let unsupported: Vec<PropertyId> = request
            .property_ids()
            .iter()
            .chain(predicate.into_iter().flat_map(|p| p.property_ids()))
            .filter(|id| !is_supported(id))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if unsupported.is_empty() {
            Ok(())
        } else {
            Err(ControllerError::UnsupportedProperty {
                resource_type: resource_type.clone(),
                property_ids: unsupported,
            })
        }
    }

    /// Verifies that every ancestor key required by `predicate` exists
    fn check_parents(
        &self,
        resource_type: &ResourceType,
        schema: &Schema,
        predicate: &Predicate,
    ) -> ControllerResult<()> {
        for (property_id, value) in predicate.required_equalities() {
            let ancestor = schema
                .key_property_ids()
                .find(|(t, id)| *id == property_id && *t != resource_type)
                .map(|(t, _)| t);
            let ancestor = match ancestor {
                Some(a) => a,
                None => continue,
            };

            let key = match value_as_key(value) {
                Some(k) => k,
                None => continue,
            };

            let found = self.types.get(ancestor).map_or(false, |data| {
                data.schema.key_property_id(ancestor).map_or(false, |own_key| {
                    data.resources
                        .iter()
                        .any(|r| r.property_string(own_key).as_deref() == Some(key.as_str()))
                })
            });

            if !found {
                return Err(ControllerError::NoSuchParentResource(format!(
                    "{} '{}' not found",
                    ancestor, key
                )));
            }
        }
        Ok(())
    }
}

impl ClusterController for InMemoryController {
    fn schema(&self, resource_type: &ResourceType) -> Arc<Schema> {
        self.types
            .get(resource_type)
            .map(|data| Arc::clone(&data.schema))
            .unwrap_or_default()
    }

    fn get_resources(
        &self,
        resource_type: &ResourceType,
        request: &Request,
        predicate: Option<&Predicate>,
    ) -> ControllerResult<Vec<Resource>> {
        let data = self.type_data(resource_type)?;
        self.check_supported(resource_type, data, request, predicate)?;

        if let Some(p) = predicate {
            self.check_parents(resource_type, &data.schema, p)?;
        }

        let matching: Vec<&Resource> = data
            .resources
            .iter()
            .filter(|r| PredicateFilter::matches(r, predicate))
            .collect();

        if matching.is_empty() {
            let own_key = data.schema.key_property_id(resource_type);
            let bound = predicate
                .into_iter()
                .flat_map(Predicate::required_equalities)
                .find(|(id, _)| Some(*id) == own_key);
            if let Some((_, value)) = bound {
                return Err(ControllerError::NoSuchResource(format!(
                    "{} '{}' not found",
                    resource_type,
                    value_as_key(value).unwrap_or_default()
                )));
            }
        }

        trace!(
            resource_type = %resource_type,
            matched = matching.len(),
            total = data.resources.len(),
            "in-memory scan"
        );

        if request.is_all_properties() {
            return Ok(matching.into_iter().cloned().collect());
        }

        let mut ids = request.property_ids().clone();
        ids.extend(data.schema.key_property_ids().map(|(_, id)| id.clone()));
        // callers re-filter rows with the same predicate
        if let Some(p) = predicate {
            ids.extend(p.property_ids().into_iter().cloned());
        }
        Ok(matching.into_iter().map(|r| r.project(&ids)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn controller() -> InMemoryController {
        let fixture: Fixture = serde_json::from_value(json!({
            "types": {
                "Cluster": {
                    "schema": {"keys": {"Cluster": "Clusters/cluster_name"}},
                    "resources": [{"Clusters/cluster_name": "c1"}]
                },
                "Host": {
                    "schema": {"keys": {
                        "Cluster": "Hosts/cluster_name",
                        "Host": "Hosts/host_name"
                    }},
                    "supported_properties": ["Hosts/rack", "metrics"],
                    "resources": [
                        {"Hosts/cluster_name": "c1", "Hosts/host_name": "h1", "Hosts/rack": "r1"},
                        {"Hosts/cluster_name": "c1", "Hosts/host_name": "h2", "Hosts/rack": "r2"}
                    ]
                }
            }
        }))
        .unwrap();
        InMemoryController::from_fixture(&fixture)
    }

    #[test]
    fn test_get_resources_filters_by_predicate() {
        let c = controller();
        let rows = c
            .get_resources(
                &"Host".into(),
                &Request::all(),
                Some(&Predicate::equals("Hosts/rack", "r2")),
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].property_string(&"Hosts/host_name".into()), Some("h2".into()));
    }

    #[test]
    fn test_projection_keeps_keys() {
        let c = controller();
        let request = Request::new(BTreeSet::from([PropertyId::from("Hosts/rack")]), BTreeMap::new());
        let rows = c.get_resources(&"Host".into(), &request, None).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].property_value(&"Hosts/host_name".into()).is_some());
        assert!(rows[0].property_value(&"Hosts/rack".into()).is_some());
    }

    #[test]
    fn test_projection_keeps_predicate_properties() {
        let c = controller();
        let request = Request::new(BTreeSet::from([PropertyId::from("metrics")]), BTreeMap::new());
        let p = Predicate::equals("Hosts/rack", "r1");
        let rows = c.get_resources(&"Host".into(), &request, Some(&p)).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].property_value(&"Hosts/rack".into()).is_some());

        let filtered = c.get_iterable(&"Host".into(), &rows, &request, Some(&p)).unwrap();
        assert_eq!(filtered, rows);
    }

    #[test]
    fn test_unsupported_property() {
        let c = controller();
        let request = Request::new(BTreeSet::from([PropertyId::from("Hosts/bogus")]), BTreeMap::new());
        let err = c.get_resources(&"Host".into(), &request, None).unwrap_err();
        assert_eq!(err.code(), "CLUSTERQ_UNSUPPORTED_PROPERTY");

        let nested = Request::new(BTreeSet::from([PropertyId::from("metrics/cpu")]), BTreeMap::new());
        assert!(c.get_resources(&"Host".into(), &nested, None).is_ok());
    }

    #[test]
    fn test_no_such_resource() {
        let c = controller();
        let err = c
            .get_resources(
                &"Host".into(),
                &Request::all(),
                Some(&Predicate::equals("Hosts/host_name", "h9")),
            )
            .unwrap_err();
        assert_eq!(err, ControllerError::NoSuchResource("Host 'h9' not found".into()));
    }

    #[test]
    fn test_no_such_parent_resource() {
        let c = controller();
        let err = c
            .get_resources(
                &"Host".into(),
                &Request::all(),
                Some(&Predicate::equals("Hosts/cluster_name", "c9")),
            )
            .unwrap_err();
        assert_eq!(err.code(), "CLUSTERQ_NO_SUCH_PARENT_RESOURCE");
    }

    #[test]
    fn test_batched_or_never_reports_missing() {
        let c = controller();
        let p = Predicate::or([
            Predicate::equals("Hosts/host_name", "h8"),
            Predicate::equals("Hosts/host_name", "h9"),
        ]);
        let rows = c.get_resources(&"Host".into(), &Request::all(), p.as_ref()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_unknown_type_is_system_failure() {
        let c = controller();
        let err = c.get_resources(&"Service".into(), &Request::all(), None).unwrap_err();
        assert_eq!(err.code(), "CLUSTERQ_SYSTEM_FAILURE");
        assert_eq!(*c.schema(&"Service".into()), Schema::default());
    }
}
