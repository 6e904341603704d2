//! Query engine for clusterq
//!
//! Builds a tree of `Query` nodes from property selections, executes it
//! against a `ClusterController` with one provider call per node, and
//! assembles the hierarchical result.

mod errors;
mod fields;
mod query;
mod result;

pub use errors::{QueryError, QueryResult};
pub use fields::{parse_fields, FieldSelection};
pub use query::{Query, WILDCARD};
pub use result::{ExecutionResult, PageInfo};
