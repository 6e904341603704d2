//! Schema error types
//!
//! Error codes:
//! - CLUSTERQ_INVALID_PROPERTY_ID (REJECT)

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while decoding schema artifacts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Property id could not be split into a category and a name
    #[error("Invalid property id '{id}': {reason}")]
    InvalidPropertyId {
        /// The rejected input
        id: String,
        /// Why it was rejected
        reason: &'static str,
    },
}

impl SchemaError {
    /// Create an invalid property id error
    pub fn invalid_property_id(id: impl Into<String>, reason: &'static str) -> Self {
        SchemaError::InvalidPropertyId {
            id: id.into(),
            reason,
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::InvalidPropertyId { .. } => "CLUSTERQ_INVALID_PROPERTY_ID",
        }
    }
}
