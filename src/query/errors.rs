//! Query error types
//!
//! Error codes:
//! - Controller errors keep their own codes
//! - CLUSTERQ_INVALID_PROPERTY_ID (REJECT)
//! - CLUSTERQ_INVALID_FIELDS (REJECT)
//! - CLUSTERQ_UNKNOWN_RESOURCE_TYPE (REJECT)

use thiserror::Error;

use crate::controller::ControllerError;
use crate::schema::{ResourceType, SchemaError};

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors surfaced by query construction and execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Raised by the cluster controller, passed through unmodified
    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Malformed field selection string
    #[error("Invalid fields '{fields}': {reason}")]
    InvalidFields { fields: String, reason: String },

    /// No resource definition for the requested type
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(ResourceType),
}

impl QueryError {
    pub fn invalid_fields(fields: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryError::InvalidFields {
            fields: fields.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::Controller(e) => e.code(),
            QueryError::Schema(e) => e.code(),
            QueryError::InvalidFields { .. } => "CLUSTERQ_INVALID_FIELDS",
            QueryError::UnknownResourceType(_) => "CLUSTERQ_UNKNOWN_RESOURCE_TYPE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_errors_pass_through() {
        let err: QueryError = ControllerError::NoSuchParentResource("Cluster 'c1' not found".into()).into();
        assert_eq!(err.code(), "CLUSTERQ_NO_SUCH_PARENT_RESOURCE");
        assert_eq!(err.to_string(), "Parent resource not found: Cluster 'c1' not found");
    }

    #[test]
    fn test_own_codes() {
        assert_eq!(
            QueryError::invalid_fields("a[", "unclosed bracket").code(),
            "CLUSTERQ_INVALID_FIELDS"
        );
        assert_eq!(
            QueryError::UnknownResourceType("Rack".into()).code(),
            "CLUSTERQ_UNKNOWN_RESOURCE_TYPE"
        );
    }
}
