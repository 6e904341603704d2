//! Schema resolution for clusterq
//!
//! Maps resource types to their key properties and defines the flat
//! property-id encoding shared by every other subsystem.

mod errors;
mod property;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use property::{PropertyId, PATH_SEPARATOR};
pub use types::{is_unbound, KeyBinding, KeyValueMap, ResourceType, Schema};
