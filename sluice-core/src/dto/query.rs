//! Query DTOs for the managed query service HTTP API

use serde::{Deserialize, Serialize};

use crate::domain::query::QueryExecution;
use crate::domain::results::{ColumnInfo, ResultPage};

/// Request to submit a query for execution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartQueryExecution {
    pub query_string: String,
    pub work_group: String,
}

/// Response to a query submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartQueryExecutionResponse {
    pub query_execution_id: String,
}

/// Response to a status request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetQueryExecutionResponse {
    pub query_execution: QueryExecution,
}

/// Response to a results page request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetQueryResultsResponse {
    pub result_set: ResultSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultSet {
    #[serde(default)]
    pub rows: Vec<ResultRow>,
    #[serde(default)]
    pub result_set_metadata: ResultSetMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultSetMetadata {
    #[serde(default)]
    pub column_info: Vec<ColumnInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultRow {
    #[serde(default)]
    pub data: Vec<Datum>,
}

/// A single field; the service omits `VarCharValue` for nulls
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Datum {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub var_char_value: Option<String>,
}

impl From<GetQueryResultsResponse> for ResultPage {
    fn from(response: GetQueryResultsResponse) -> Self {
        let ResultSet {
            rows,
            result_set_metadata,
        } = response.result_set;

        Self {
            rows: rows
                .into_iter()
                .map(|row| row.data.into_iter().map(|d| d.var_char_value).collect())
                .collect(),
            columns: result_set_metadata.column_info,
            next_token: response.next_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_response_into_page() {
        let json = r#"{
            "ResultSet": {
                "Rows": [
                    {"Data": [{"VarCharValue": "column_name"}]},
                    {"Data": [{}]}
                ],
                "ResultSetMetadata": {
                    "ColumnInfo": [{"Name": "column_name", "Type": "integer"}]
                }
            },
            "NextToken": "page2"
        }"#;

        let response: GetQueryResultsResponse = serde_json::from_str(json).unwrap();
        let page = ResultPage::from(response);

        assert_eq!(
            page.rows,
            vec![vec![Some("column_name".to_string())], vec![None]]
        );
        assert_eq!(page.columns, vec![ColumnInfo::new("column_name", "integer")]);
        assert_eq!(page.next_token.as_deref(), Some("page2"));
    }

    #[test]
    fn test_start_request_wire_names() {
        let req = StartQueryExecution {
            query_string: "SELECT 1".to_string(),
            work_group: "primary".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"QueryString":"SELECT 1","WorkGroup":"primary"}"#
        );
    }
}
