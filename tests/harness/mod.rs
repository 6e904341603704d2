//! Shared harness for query integration tests
//!
//! Provides:
//! - The cluster fixture (2 clusters, 6 hosts, host components, services)
//! - A recording controller that logs every provider query

#![allow(dead_code)]

pub mod recording;

pub use recording::*;

use std::sync::Arc;

use clusterq::controller::{ClusterController, Fixture, InMemoryController};
use clusterq::query::Query;
use clusterq::resource::ResourceCatalog;
use clusterq::schema::{KeyBinding, KeyValueMap, ResourceType};

pub const FIXTURE: &str = include_str!("../fixtures/cluster.json");

/// Controller and catalog over the cluster fixture
pub fn setup() -> (Arc<RecordingController>, Arc<ResourceCatalog>) {
    let fixture: Fixture = serde_json::from_str(FIXTURE).unwrap();
    let controller = RecordingController::new(InMemoryController::from_fixture(&fixture));
    (Arc::new(controller), Arc::new(fixture.definitions))
}

/// Builds a key-value map; `None` leaves a type unbound
pub fn kv(entries: &[(&str, Option<&str>)]) -> KeyValueMap {
    entries
        .iter()
        .map(|(t, v)| {
            let binding = match v {
                Some(v) => KeyBinding::bound(*v),
                None => KeyBinding::Unbound,
            };
            (ResourceType::from(*t), binding)
        })
        .collect()
}

/// Query over the recording controller
pub fn query(
    resource_type: &str,
    key_value_map: KeyValueMap,
    controller: &Arc<RecordingController>,
    catalog: &Arc<ResourceCatalog>,
) -> Query {
    let controller: Arc<dyn ClusterController> = controller.clone();
    Query::new(resource_type, key_value_map, Arc::clone(catalog), controller).unwrap()
}
