//! Controller wrapper recording provider queries

use std::sync::{Arc, Mutex};

use clusterq::controller::{ClusterController, ControllerResult, InMemoryController, Request};
use clusterq::predicate::Predicate;
use clusterq::resource::Resource;
use clusterq::schema::{ResourceType, Schema};

/// One `get_resources` call
#[derive(Debug, Clone)]
pub struct RecordedQuery {
    pub resource_type: ResourceType,
    pub request: Request,
    pub predicate: Option<Predicate>,
}

/// Delegates to an in-memory controller and logs every provider query
pub struct RecordingController {
    inner: InMemoryController,
    queries: Mutex<Vec<RecordedQuery>>,
}

impl RecordingController {
    pub fn new(inner: InMemoryController) -> Self {
        Self {
            inner,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Every recorded query in call order
    pub fn queries(&self) -> Vec<RecordedQuery> {
        self.queries.lock().unwrap().clone()
    }

    /// Recorded queries for one type
    pub fn queries_for(&self, resource_type: &str) -> Vec<RecordedQuery> {
        self.queries()
            .into_iter()
            .filter(|q| q.resource_type.as_str() == resource_type)
            .collect()
    }

    /// Resource types in call order
    pub fn call_order(&self) -> Vec<String> {
        self.queries()
            .into_iter()
            .map(|q| q.resource_type.to_string())
            .collect()
    }
}

impl ClusterController for RecordingController {
    fn schema(&self, resource_type: &ResourceType) -> Arc<Schema> {
        self.inner.schema(resource_type)
    }

    fn get_resources(
        &self,
        resource_type: &ResourceType,
        request: &Request,
        predicate: Option<&Predicate>,
    ) -> ControllerResult<Vec<Resource>> {
        self.queries.lock().unwrap().push(RecordedQuery {
            resource_type: resource_type.clone(),
            request: request.clone(),
            predicate: predicate.cloned(),
        });
        self.inner.get_resources(resource_type, request, predicate)
    }
}
