//! clusterq - schema-driven resource queries for cluster control planes
//!
//! A request names a resource type, the keys that scope it, and the
//! properties and sub-resources to return. The `query` module turns that
//! into a tree of provider calls against a `ClusterController` and
//! assembles the nested result.

pub mod cli;
pub mod controller;
pub mod predicate;
pub mod query;
pub mod resource;
pub mod schema;
pub mod tree;
