//! Controller error types
//!
//! Error codes:
//! - CLUSTERQ_UNSUPPORTED_PROPERTY (REJECT)
//! - CLUSTERQ_SYSTEM_FAILURE (ERROR)
//! - CLUSTERQ_NO_SUCH_RESOURCE (REJECT)
//! - CLUSTERQ_NO_SUCH_PARENT_RESOURCE (REJECT)
//!
//! Raised by cluster controllers and propagated unmodified through query
//! execution. Nothing in this crate retries them.

use thiserror::Error;

use crate::schema::{PropertyId, ResourceType};

/// Result type for controller operations
pub type ControllerResult<T> = Result<T, ControllerError>;

/// Errors raised by a cluster controller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// Requested properties are not exposed for this resource type
    #[error("Unsupported properties for {resource_type}: {}", join_ids(.property_ids))]
    UnsupportedProperty {
        resource_type: ResourceType,
        property_ids: Vec<PropertyId>,
    },

    /// Provider-internal failure
    #[error("System failure: {0}")]
    SystemFailure(String),

    /// A bound instance key does not resolve to any resource
    #[error("Resource not found: {0}")]
    NoSuchResource(String),

    /// An ancestor key does not resolve to any resource
    #[error("Parent resource not found: {0}")]
    NoSuchParentResource(String),
}

fn join_ids(ids: &[PropertyId]) -> String {
    ids.iter()
        .map(PropertyId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ControllerError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ControllerError::UnsupportedProperty { .. } => "CLUSTERQ_UNSUPPORTED_PROPERTY",
            ControllerError::SystemFailure(_) => "CLUSTERQ_SYSTEM_FAILURE",
            ControllerError::NoSuchResource(_) => "CLUSTERQ_NO_SUCH_RESOURCE",
            ControllerError::NoSuchParentResource(_) => "CLUSTERQ_NO_SUCH_PARENT_RESOURCE",
        }
    }

    /// Returns true for failures caused by the request rather than the provider
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ControllerError::SystemFailure(_))
    }
}
