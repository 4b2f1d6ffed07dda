//! Error types for the Sluice query client

use sluice_core::domain::query::QueryState;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Sluice query client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The query reached a terminal state other than SUCCEEDED
    #[error("Query {execution_id} finished in state {state}: {reason}")]
    QueryFailed {
        execution_id: String,
        state: QueryState,
        /// Reason reported by the query service, empty if none was given
        reason: String,
    },

    /// The retry budget ran out before the query reached a terminal state
    #[error("Query {execution_id} did not finish after {attempts} status checks")]
    Timeout { execution_id: String, attempts: u64 },

    /// A result field could not be coerced to its column's declared type
    #[error("Invalid value {value:?} for column '{column}' of type {column_type}")]
    InvalidValue {
        column: String,
        column_type: String,
        value: String,
    },

    /// Output location is not a `scheme://bucket/key` URL
    #[error("Invalid object location: {0}")]
    InvalidLocation(String),

    /// A succeeded query carried no output location
    #[error("Query {0} has no output location")]
    MissingOutputLocation(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if the query itself failed or timed out
    ///
    /// A timeout is a specialization of a query failure: both mean the query
    /// must be resubmitted by the caller.
    pub fn is_query_error(&self) -> bool {
        matches!(self, Self::QueryFailed { .. } | Self::Timeout { .. })
    }

    /// Check if polling gave up before the query finished
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || matches!(self, Self::ApiError { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_query_error() {
        let err = ClientError::Timeout {
            execution_id: "abc".to_string(),
            attempts: 3,
        };
        assert!(err.is_query_error());
        assert!(err.is_timeout());
    }

    #[test]
    fn test_failed_is_not_timeout() {
        let err = ClientError::QueryFailed {
            execution_id: "abc".to_string(),
            state: QueryState::Failed,
            reason: "boom".to_string(),
        };
        assert!(err.is_query_error());
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "Query abc finished in state FAILED: boom");
    }

    #[test]
    fn test_transport_errors_are_not_query_errors() {
        let err = ClientError::api_error(500, "internal");
        assert!(!err.is_query_error());
        assert!(!err.is_not_found());
        assert!(ClientError::api_error(404, "gone").is_not_found());
    }
}
