//! HTTP query backend
//!
//! Talks JSON to the managed query service. This is a stateless HTTP client;
//! polling and result parsing live in the client layer.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use sluice_core::domain::query::QueryExecution;
use sluice_core::domain::results::ResultPage;
use sluice_core::dto::query::{
    GetQueryExecutionResponse, GetQueryResultsResponse, StartQueryExecution,
    StartQueryExecutionResponse,
};
use tracing::debug;

use super::{QueryBackend, join_url};
use crate::error::{ClientError, Result};

/// HTTP implementation of QueryBackend
#[derive(Debug, Clone)]
pub struct HttpQueryBackend {
    /// Base URL of the query service (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl HttpQueryBackend {
    /// Creates a new HTTP query backend
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the query service
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Creates a backend with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the query service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[async_trait]
impl QueryBackend for HttpQueryBackend {
    async fn start_query_execution(&self, query: &str, work_group: &str) -> Result<String> {
        let url = join_url(&self.base_url, ["queries"])?;
        debug!("Submitting query to {} (work group {})", url, work_group);

        let response = self
            .client
            .post(url)
            .json(&StartQueryExecution {
                query_string: query.to_string(),
                work_group: work_group.to_string(),
            })
            .send()
            .await?;

        let started: StartQueryExecutionResponse = self.handle_response(response).await?;
        Ok(started.query_execution_id)
    }

    async fn get_query_execution(&self, execution_id: &str) -> Result<QueryExecution> {
        let url = join_url(&self.base_url, ["queries", execution_id])?;
        let response = self.client.get(url).send().await?;

        let body: GetQueryExecutionResponse = self.handle_response(response).await?;
        let mut execution = body.query_execution;
        if execution.query_execution_id.is_empty() {
            execution.query_execution_id = execution_id.to_string();
        }

        Ok(execution)
    }

    async fn get_query_results(
        &self,
        execution_id: &str,
        next_token: Option<&str>,
    ) -> Result<ResultPage> {
        let mut url = join_url(&self.base_url, ["queries", execution_id, "results"])?;
        if let Some(token) = next_token {
            url.query_pairs_mut().append_pair("NextToken", token);
        }

        debug!("Fetching results page at {}", url);
        let response = self.client.get(url).send().await?;

        let body: GetQueryResultsResponse = self.handle_response(response).await?;
        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_trims_trailing_slash() {
        let backend = HttpQueryBackend::new("http://localhost:8080/");
        assert_eq!(backend.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_backend_with_custom_client() {
        let backend = HttpQueryBackend::with_client("http://localhost:8080", Client::new());
        assert_eq!(backend.base_url(), "http://localhost:8080");
    }
}
