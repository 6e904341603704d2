//! Query node
//!
//! A `Query` targets one resource type under a key-value map of ancestor
//! bindings. Nodes form a tree mirroring the resource definitions: each
//! sub-resource is a child `Query` built lazily on first need.
//!
//! Execution issues one `get_resources` call per node. Children are fetched
//! in one batch covering every parent row (an OR of per-row key
//! equalities), then each parent row's share is carved out while the
//! result tree is built.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::errors::{QueryError, QueryResult};
use super::fields::parse_fields;
use super::result::{ExecutionResult, PageInfo};
use crate::controller::{ClusterController, PageRequest, Request, TemporalInfo};
use crate::predicate::Predicate;
use crate::resource::{Resource, ResourceCatalog, ResourceDefinition};
use crate::schema::{is_unbound, KeyBinding, KeyValueMap, PropertyId, ResourceType, Schema, PATH_SEPARATOR};
use crate::tree::{ResultTree, IS_COLLECTION};

/// Property name selecting everything
pub const WILDCARD: &str = "*";

/// One node of a query tree
pub struct Query {
    definition: ResourceDefinition,
    controller: Arc<dyn ClusterController>,
    catalog: Arc<ResourceCatalog>,
    key_value_map: KeyValueMap,
    /// Bindings inherited at construction; each parent row rebinds on top
    base_key_value_map: KeyValueMap,
    /// False for sub-resources exposed under their singular name
    exposed_as_collection: bool,
    property_ids: BTreeSet<PropertyId>,
    /// `None` holds the default applied to every property
    temporal_info: BTreeMap<Option<PropertyId>, TemporalInfo>,
    all_properties: bool,
    user_predicate: Option<Predicate>,
    page_request: Option<PageRequest>,
    sub_resources: Option<BTreeMap<String, Query>>,
    selected_sub_resources: BTreeSet<String>,
    /// Every key-value map this node was queried under
    key_value_maps: BTreeSet<KeyValueMap>,
    /// Rows returned by this node's provider query
    resources: Vec<Resource>,
}

impl Query {
    /// Creates a query for `resource_type`.
    ///
    /// Fails if the catalog has no definition for the type.
    pub fn new(
        resource_type: impl Into<ResourceType>,
        key_value_map: KeyValueMap,
        catalog: Arc<ResourceCatalog>,
        controller: Arc<dyn ClusterController>,
    ) -> QueryResult<Self> {
        let resource_type = resource_type.into();
        let definition = catalog
            .definition(&resource_type)
            .cloned()
            .ok_or(QueryError::UnknownResourceType(resource_type))?;
        Ok(Self::with_definition(definition, key_value_map, catalog, controller))
    }

    fn with_definition(
        definition: ResourceDefinition,
        key_value_map: KeyValueMap,
        catalog: Arc<ResourceCatalog>,
        controller: Arc<dyn ClusterController>,
    ) -> Self {
        Self {
            definition,
            controller,
            catalog,
            base_key_value_map: key_value_map.clone(),
            key_value_map,
            exposed_as_collection: true,
            property_ids: BTreeSet::new(),
            temporal_info: BTreeMap::new(),
            all_properties: false,
            user_predicate: None,
            page_request: None,
            sub_resources: None,
            selected_sub_resources: BTreeSet::new(),
            key_value_maps: BTreeSet::new(),
            resources: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn resource_type(&self) -> &ResourceType {
        &self.definition.resource_type
    }

    pub fn definition(&self) -> &ResourceDefinition {
        &self.definition
    }

    pub fn key_value_map(&self) -> &KeyValueMap {
        &self.key_value_map
    }

    /// Locally selected property ids
    pub fn property_ids(&self) -> &BTreeSet<PropertyId> {
        &self.property_ids
    }

    pub fn is_all_properties(&self) -> bool {
        self.all_properties
    }

    /// Time range for a property, falling back to the global default
    pub fn temporal_info(&self, id: &PropertyId) -> Option<&TemporalInfo> {
        self.temporal_info
            .get(&Some(id.clone()))
            .or_else(|| self.temporal_info.get(&None))
    }

    pub fn user_predicate(&self) -> Option<&Predicate> {
        self.user_predicate.as_ref()
    }

    pub fn set_user_predicate(&mut self, predicate: Option<Predicate>) {
        self.user_predicate = predicate;
    }

    pub fn page_request(&self) -> Option<&PageRequest> {
        self.page_request.as_ref()
    }

    pub fn set_page_request(&mut self, page_request: Option<PageRequest>) {
        self.page_request = page_request;
    }

    /// True when the own resource type has no bound key
    pub fn is_collection(&self) -> bool {
        is_unbound(&self.key_value_map, self.resource_type())
    }

    /// Names of the selected sub-resources
    pub fn selected_sub_resources(&self) -> &BTreeSet<String> {
        &self.selected_sub_resources
    }

    /// Key-value maps this node has been queried under
    pub fn key_value_maps(&self) -> &BTreeSet<KeyValueMap> {
        &self.key_value_maps
    }

    /// Rows fetched by the last execution
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Child queries by exposed name, materialized on first access
    pub fn sub_resources(&mut self) -> &BTreeMap<String, Query> {
        self.resolve_sub_resources()
    }

    /// Child query by exposed name
    pub fn sub_resource_mut(&mut self, name: &str) -> Option<&mut Query> {
        self.resolve_sub_resources().get_mut(name)
    }

    fn schema(&self) -> Arc<Schema> {
        self.controller.schema(self.resource_type())
    }

    // ------------------------------------------------------------------
    // Property selection
    // ------------------------------------------------------------------

    /// Selects a property, a category, a sub-resource path or everything.
    ///
    /// A path whose first segment names a sub-resource selects that
    /// sub-resource, even when a local property of the same name exists.
    pub fn add_property(
        &mut self,
        category: Option<&str>,
        name: Option<&str>,
        temporal_info: Option<TemporalInfo>,
    ) {
        if category.is_none() && name == Some(WILDCARD) {
            self.add_all_properties(temporal_info);
            return;
        }

        if self.add_property_to_sub_resource(category, name, temporal_info) {
            // rows must carry the keys needed to bind sub-resources
            let schema = self.schema();
            let keys: Vec<PropertyId> = self
                .key_value_map
                .keys()
                .filter_map(|t| schema.key_property_id(t).cloned())
                .collect();
            for id in keys {
                self.add_local_property(id);
            }
            return;
        }

        let name = name.filter(|n| *n != WILDCARD);
        let property_id = match (category, name) {
            (Some(category), Some(name)) => PropertyId::encode(Some(category), name),
            (Some(category), None) => PropertyId::new_unchecked(category),
            (None, Some(name)) => PropertyId::encode(None, name),
            (None, None) => return,
        };
        if let Some(t) = temporal_info {
            self.temporal_info.insert(Some(property_id.clone()), t);
        }
        self.add_local_property(property_id);
    }

    /// Adds a property id to this node only
    pub fn add_local_property(&mut self, property_id: PropertyId) {
        self.property_ids.insert(property_id);
    }

    /// Applies a comma-separated field list
    pub fn add_fields(&mut self, fields: &str) -> QueryResult<()> {
        for field in parse_fields(fields)? {
            self.add_property(field.category.as_deref(), Some(&field.name), field.temporal_info);
        }
        Ok(())
    }

    fn add_all_properties(&mut self, temporal_info: Option<TemporalInfo>) {
        self.all_properties = true;
        if let Some(t) = temporal_info {
            self.temporal_info.insert(None, t);
        }
        let names: Vec<String> = self.resolve_sub_resources().keys().cloned().collect();
        self.selected_sub_resources.extend(names);
    }

    fn add_property_to_sub_resource(
        &mut self,
        category: Option<&str>,
        name: Option<&str>,
        temporal_info: Option<TemporalInfo>,
    ) -> bool {
        let (path, property) = match (category, name) {
            (Some(category), name) => (category, name),
            (None, Some(name)) => (name, None),
            (None, None) => return false,
        };
        let (head, suffix) = match path.split_once(PATH_SEPARATOR) {
            Some((head, suffix)) => (head, Some(suffix)),
            None => (path, None),
        };

        let child = match self.resolve_sub_resources().get_mut(head) {
            Some(child) => child,
            None => return false,
        };
        if property.is_some() || suffix.is_some() {
            child.add_property(suffix, property, temporal_info);
        }
        self.selected_sub_resources.insert(head.to_string());
        true
    }

    fn add_collection_properties(&mut self) {
        let schema = self.schema();
        let ids: Vec<PropertyId> = std::iter::once(self.resource_type())
            .chain(self.key_value_map.keys())
            .filter_map(|t| schema.key_property_id(t).cloned())
            .collect();
        for id in ids {
            self.add_property(id.category(), Some(id.name()), None);
        }
    }

    // ------------------------------------------------------------------
    // Sub-resource graph
    // ------------------------------------------------------------------

    fn resolve_sub_resources(&mut self) -> &mut BTreeMap<String, Query> {
        if self.sub_resources.is_none() {
            let built = self.build_sub_resources();
            self.sub_resources = Some(built);
        }
        self.sub_resources.get_or_insert_with(BTreeMap::new)
    }

    fn build_sub_resources(&self) -> BTreeMap<String, Query> {
        let mut children = BTreeMap::new();
        for sub in &self.definition.sub_resources {
            let definition = match self.catalog.definition(&sub.resource_type) {
                Some(definition) => definition.clone(),
                None => {
                    warn!(
                        parent = %self.resource_type(),
                        sub_resource = %sub.resource_type,
                        "sub-resource has no definition; skipped"
                    );
                    continue;
                }
            };

            let mut child = Query::with_definition(
                definition,
                self.key_value_map.clone(),
                Arc::clone(&self.catalog),
                Arc::clone(&self.controller),
            );
            let schema = self.controller.schema(&sub.resource_type);
            let keys = std::iter::once(&sub.resource_type).chain(&sub.additional_foreign_keys);
            for resource_type in keys {
                if let Some(id) = schema.key_property_id(resource_type) {
                    child.add_local_property(id.clone());
                }
            }

            child.exposed_as_collection = sub.is_collection;
            let name = child.definition.exposed_name(sub.is_collection).to_string();
            children.insert(name, child);
        }
        children
    }

    // ------------------------------------------------------------------
    // Predicates and requests
    // ------------------------------------------------------------------

    /// Key bindings combined with the user predicate
    pub fn predicate(&self) -> Option<Predicate> {
        self.predicate_for(&self.key_value_map)
    }

    fn predicate_for(&self, key_value_map: &KeyValueMap) -> Option<Predicate> {
        match (self.structural_predicate(key_value_map), &self.user_predicate) {
            (None, user) => user.clone(),
            (Some(structural), None) => Some(structural),
            (Some(structural), Some(user)) => Some(Predicate::And(vec![user.clone(), structural])),
        }
    }

    fn structural_predicate(&self, key_value_map: &KeyValueMap) -> Option<Predicate> {
        let schema = self.schema();
        let mut equalities: Vec<Predicate> = Vec::new();
        for (resource_type, binding) in key_value_map {
            let (Some(id), KeyBinding::Bound(value)) = (schema.key_property_id(resource_type), binding) else {
                continue;
            };
            let equality = Predicate::equals(id.clone(), value.as_str());
            if !equalities.contains(&equality) {
                equalities.push(equality);
            }
        }
        Predicate::and(equalities)
    }

    /// Provider request for the current selection
    pub fn create_request(&self) -> Request {
        let mut temporal_info = BTreeMap::new();
        for id in &self.property_ids {
            if let Some(t) = self.temporal_info(id) {
                temporal_info.insert(id.clone(), *t);
            }
        }
        let property_ids = if self.all_properties {
            BTreeSet::new()
        } else {
            self.property_ids.clone()
        };
        Request::new(property_ids, temporal_info)
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Runs the query against the controller.
    ///
    /// A node tree is meant to be executed once.
    pub fn execute(&mut self) -> QueryResult<ExecutionResult> {
        debug!(resource_type = %self.resource_type(), "executing query");

        self.query_for_resources()?;
        let (rows, page) = self.select_rows()?;
        self.query_for_sub_resources(&rows)?;
        let tree = self.result_tree(rows)?;

        Ok(ExecutionResult::new(tree, page))
    }

    fn query_for_resources(&mut self) -> QueryResult<()> {
        let predicate = self.predicate();
        self.resources = self.do_query(predicate.as_ref())?;
        self.key_value_maps.insert(self.key_value_map.clone());
        Ok(())
    }

    fn do_query(&mut self, predicate: Option<&Predicate>) -> QueryResult<Vec<Resource>> {
        if self.is_collection() {
            self.add_collection_properties();
        }
        if self.property_ids.is_empty() && self.selected_sub_resources.is_empty() {
            let names: Vec<String> = self.resolve_sub_resources().keys().cloned().collect();
            self.selected_sub_resources.extend(names);
        }

        let request = self.create_request();
        debug!(
            resource_type = %self.resource_type(),
            %request,
            predicate = %DisplayPredicate(predicate),
            "querying resources"
        );
        let fetched = self
            .controller
            .get_resources(self.resource_type(), &request, predicate)?;

        let mut seen = HashSet::with_capacity(fetched.len());
        Ok(fetched
            .into_iter()
            .filter(|resource| seen.insert(resource.clone()))
            .collect())
    }

    fn select_rows(&self) -> QueryResult<(Vec<Resource>, Option<PageInfo>)> {
        let predicate = self.predicate();
        let request = self.create_request();
        match &self.page_request {
            Some(page_request) => {
                let page = self.controller.get_page(
                    self.resource_type(),
                    &self.resources,
                    &request,
                    predicate.as_ref(),
                    page_request,
                )?;
                let info = PageInfo {
                    offset: page.offset,
                    total_count: page.total_count,
                };
                Ok((page.resources, Some(info)))
            }
            None => {
                let rows = self.controller.get_iterable(
                    self.resource_type(),
                    &self.resources,
                    &request,
                    predicate.as_ref(),
                )?;
                Ok((rows, None))
            }
        }
    }

    fn query_for_sub_resources(&mut self, rows: &[Resource]) -> QueryResult<()> {
        if self.selected_sub_resources.is_empty() {
            return Ok(());
        }
        let row_maps = self.row_key_value_maps(rows);
        let selected: Vec<String> = self.selected_sub_resources.iter().cloned().collect();

        for name in selected {
            let Some(child) = self.sub_resources.as_mut().and_then(|s| s.get_mut(&name)) else {
                continue;
            };
            child.key_value_maps.extend(row_maps.iter().cloned());

            if row_maps.is_empty() {
                trace!(sub_resource = %name, "no parent rows; sub-resource not queried");
                child.resources.clear();
                continue;
            }

            let mut seen = HashSet::with_capacity(row_maps.len());
            let alternatives: Vec<Predicate> = row_maps
                .iter()
                .filter_map(|map| child.predicate_for(map))
                .filter(|p| seen.insert(p.clone()))
                .collect();
            trace!(
                sub_resource = %name,
                parent_rows = rows.len(),
                alternatives = alternatives.len(),
                "batching sub-resource query"
            );

            let predicate = Predicate::or(alternatives);
            child.resources = child.do_query(predicate.as_ref())?;
            let child_rows = child.resources.clone();
            child.query_for_sub_resources(&child_rows)?;
        }
        Ok(())
    }

    /// Row-specific maps for every row under every accumulated map.
    ///
    /// Accumulated maps whose bound keys contradict a row are skipped for
    /// that row.
    fn row_key_value_maps(&self, rows: &[Resource]) -> Vec<KeyValueMap> {
        let mut seen = BTreeSet::new();
        let mut maps: Vec<KeyValueMap> = Vec::new();
        for resource in rows {
            for base in &self.key_value_maps {
                if self.conflicts(resource, base) {
                    continue;
                }
                let map = self.row_key_value_map(resource, base);
                if seen.insert(map.clone()) {
                    maps.push(map);
                }
            }
        }
        maps
    }

    fn conflicts(&self, resource: &Resource, base: &KeyValueMap) -> bool {
        let schema = self.controller.schema(resource.resource_type());
        base.iter().any(|(resource_type, binding)| {
            let (KeyBinding::Bound(expected), Some(id)) = (binding, schema.key_property_id(resource_type)) else {
                return false;
            };
            matches!(resource.property_string(id), Some(actual) if actual != *expected)
        })
    }

    /// Binds unresolved keys of `base` from the row, then adds the row's own key
    fn row_key_value_map(&self, resource: &Resource, base: &KeyValueMap) -> KeyValueMap {
        let schema = self.controller.schema(resource.resource_type());
        let value_of = |resource_type: &ResourceType| {
            schema
                .key_property_id(resource_type)
                .and_then(|id| resource.property_string(id))
        };

        let mut map = KeyValueMap::new();
        for (resource_type, binding) in base {
            match binding {
                KeyBinding::Bound(_) => {
                    map.insert(resource_type.clone(), binding.clone());
                }
                KeyBinding::Unbound => {
                    if let Some(value) = value_of(resource_type) {
                        map.insert(resource_type.clone(), KeyBinding::Bound(value));
                    }
                }
            }
        }
        if let Some(value) = value_of(resource.resource_type()) {
            map.insert(resource.resource_type().clone(), KeyBinding::Bound(value));
        }
        map
    }

    // ------------------------------------------------------------------
    // Result tree
    // ------------------------------------------------------------------

    fn result_tree(&mut self, rows: Vec<Resource>) -> QueryResult<ResultTree> {
        let mut tree = ResultTree::new(self.is_collection() && self.exposed_as_collection);
        if tree.is_collection() {
            tree.set_property(IS_COLLECTION, "true");
        }
        let selected: Vec<String> = self.selected_sub_resources.iter().cloned().collect();

        for resource in rows {
            let row_map = self.row_key_value_map(&resource, &self.key_value_map);
            let mut nested = BTreeMap::new();

            for name in &selected {
                let Some(child) = self.sub_resources.as_mut().and_then(|s| s.get_mut(name)) else {
                    continue;
                };
                child.key_value_map = child.base_key_value_map.clone();
                child.key_value_map.extend(row_map.clone());

                let mut child_tree = child.nested_result_tree()?;
                child_tree.set_property(IS_COLLECTION, "false");
                nested.insert(name.clone(), child_tree);
            }

            tree.add_row(resource).sub_resources = nested;
        }
        Ok(tree)
    }

    /// This node's share of its batched rows under the current bindings
    fn nested_result_tree(&mut self) -> QueryResult<ResultTree> {
        let predicate = self.predicate();
        let request = self.create_request();
        let rows = self.controller.get_iterable(
            self.resource_type(),
            &self.resources,
            &request,
            predicate.as_ref(),
        )?;
        self.result_tree(rows)
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        let same_controller = std::ptr::eq(
            Arc::as_ptr(&self.controller) as *const (),
            Arc::as_ptr(&other.controller) as *const (),
        );
        same_controller
            && self.resource_type() == other.resource_type()
            && self.property_ids == other.property_ids
            && self.key_value_map == other.key_value_map
            && self.user_predicate == other.user_predicate
            && self.page_request == other.page_request
    }
}

impl Eq for Query {}

impl Hash for Query {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.controller) as *const () as usize).hash(state);
        self.resource_type().hash(state);
        self.property_ids.hash(state);
        self.key_value_map.hash(state);
        self.user_predicate.hash(state);
        self.page_request.hash(state);
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("resource_type", self.resource_type())
            .field("key_value_map", &self.key_value_map)
            .field("property_ids", &self.property_ids)
            .field("all_properties", &self.all_properties)
            .field("user_predicate", &self.user_predicate)
            .field("page_request", &self.page_request)
            .field("selected_sub_resources", &self.selected_sub_resources)
            .finish()
    }
}

struct DisplayPredicate<'a>(Option<&'a Predicate>);

impl fmt::Display for DisplayPredicate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(p) => write!(f, "{}", p),
            None => f.write_str("<none>"),
        }
    }
}
