//! Resource model for clusterq
//!
//! Resource rows plus the static definitions describing which resource
//! types nest beneath which.

mod definition;
mod resource;

pub use definition::{ResourceCatalog, ResourceDefinition, SubResourceDefinition};
pub use resource::{value_as_key, Resource};
