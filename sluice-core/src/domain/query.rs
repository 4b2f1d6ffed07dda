//! Query execution domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Query execution record
///
/// Returned by the query service every time the status of an execution is
/// fetched. The result configuration is only populated once the query succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryExecution {
    #[serde(default)]
    pub query_execution_id: String,
    pub status: QueryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_configuration: Option<ResultConfiguration>,
}

impl QueryExecution {
    /// Location of the query's output object, if the service reported one
    pub fn output_location(&self) -> Option<&str> {
        self.result_configuration
            .as_ref()
            .and_then(|config| config.output_location.as_deref())
    }
}

/// Current status of a query execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryStatus {
    pub state: QueryState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_change_reason: Option<String>,
}

/// Query execution state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl QueryState {
    /// Whether the service will never move the execution out of this state
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the service wrote the query output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!QueryState::Queued.is_terminal());
        assert!(!QueryState::Running.is_terminal());
        assert!(QueryState::Succeeded.is_terminal());
        assert!(QueryState::Failed.is_terminal());
        assert!(QueryState::Cancelled.is_terminal());
    }

    #[test]
    fn test_deserialize_execution() {
        let json = r#"{
            "QueryExecutionId": "abc",
            "Status": {"State": "FAILED", "StateChangeReason": "syntax error"},
            "ResultConfiguration": {"OutputLocation": "s3://bucket/abc.csv"}
        }"#;

        let execution: QueryExecution = serde_json::from_str(json).unwrap();
        assert_eq!(execution.query_execution_id, "abc");
        assert_eq!(execution.status.state, QueryState::Failed);
        assert_eq!(
            execution.status.state_change_reason.as_deref(),
            Some("syntax error")
        );
        assert_eq!(execution.output_location(), Some("s3://bucket/abc.csv"));
    }

    #[test]
    fn test_deserialize_status_only() {
        let json = r#"{"Status": {"State": "RUNNING"}}"#;

        let execution: QueryExecution = serde_json::from_str(json).unwrap();
        assert_eq!(execution.status.state, QueryState::Running);
        assert!(execution.status.state_change_reason.is_none());
        assert!(execution.output_location().is_none());
    }
}
