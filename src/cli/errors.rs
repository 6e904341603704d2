//! CLI-specific error types
//!
//! All CLI errors end the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::query::QueryError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// Fixture file unreadable or malformed
    FixtureError,
    /// Malformed command-line argument
    InvalidArgument,
    /// Query construction or execution failed
    QueryFailed,
    /// I/O error (stdout)
    IoError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CLUSTERQ_CLI_CONFIG_ERROR",
            Self::FixtureError => "CLUSTERQ_CLI_FIXTURE_ERROR",
            Self::InvalidArgument => "CLUSTERQ_CLI_INVALID_ARGUMENT",
            Self::QueryFailed => "CLUSTERQ_CLI_QUERY_FAILED",
            Self::IoError => "CLUSTERQ_CLI_IO_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// Fixture error
    pub fn fixture_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::FixtureError, msg)
    }

    /// Invalid argument
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArgument, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<QueryError> for CliError {
    fn from(e: QueryError) -> Self {
        Self::new(CliErrorCode::QueryFailed, format!("[{}] {}", e.code(), e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerError;

    #[test]
    fn test_display_includes_code() {
        let err = CliError::invalid_argument("bad --key 'Cluster'");
        assert_eq!(err.to_string(), "CLUSTERQ_CLI_INVALID_ARGUMENT: bad --key 'Cluster'");
    }

    #[test]
    fn test_query_error_keeps_inner_code() {
        let err: CliError = QueryError::from(ControllerError::NoSuchResource("Host 'h9' not found".into())).into();
        assert_eq!(err.code(), &CliErrorCode::QueryFailed);
        assert!(err.message().starts_with("[CLUSTERQ_NO_SUCH_RESOURCE]"));
    }
}
