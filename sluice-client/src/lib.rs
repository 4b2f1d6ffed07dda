//! Sluice Query Client
//!
//! A thin client for a managed query service: submit a query, poll until it
//! reaches a terminal state, then read its results.
//!
//! Results can be read two ways:
//! - Raw: download the CSV object the service wrote and return string rows
//!   ([`QueryClient::execute_query`], [`QueryClient::fetch_raw_results`])
//! - Typed: page through the service's results API and coerce every field to
//!   its column's declared type ([`QueryClient::results`])
//!
//! # Example
//!
//! ```no_run
//! use sluice_client::{ClientConfig, QueryClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = QueryClient::from_config(ClientConfig::from_env());
//!
//!     let rows = client.execute_query("SELECT 1", true).await?;
//!     println!("{:?}", rows);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod coerce;
pub mod config;
pub mod csv;
pub mod error;
pub mod fake;
pub mod results;

// Re-export commonly used types
pub use backend::{HttpObjectStore, HttpQueryBackend, ObjectLocation, ObjectStore, QueryBackend};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use results::ResultReader;
pub use sluice_core::domain::query::{QueryExecution, QueryState};
pub use sluice_core::domain::results::{RawRow, Row, Value};

use std::sync::Arc;
use tracing::{debug, info, warn};

/// Client for the managed query service
///
/// Queries are submitted to the configured work group. Status is polled at a
/// fixed interval until the query finishes or the retry budget runs out.
#[derive(Clone)]
pub struct QueryClient {
    backend: Arc<dyn QueryBackend>,
    store: Arc<dyn ObjectStore>,
    config: ClientConfig,
}

impl QueryClient {
    /// Create a client over explicit backends
    ///
    /// # Arguments
    /// * `backend` - The query service
    /// * `store` - The object store holding raw query output
    /// * `config` - Work group and polling settings
    pub fn new(
        backend: Arc<dyn QueryBackend>,
        store: Arc<dyn ObjectStore>,
        config: ClientConfig,
    ) -> Self {
        Self {
            backend,
            store,
            config,
        }
    }

    /// Create a client talking HTTP to the endpoints in `config`
    pub fn from_config(config: ClientConfig) -> Self {
        let backend = Arc::new(HttpQueryBackend::new(config.endpoint.clone()));
        let store = Arc::new(HttpObjectStore::new(config.object_store_endpoint.clone()));
        Self::new(backend, store, config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // =============================================================================
    // Query Lifecycle
    // =============================================================================

    /// Run a query to completion
    ///
    /// Submits the query, waits for it to succeed and, when `fetch_results` is
    /// set, downloads its raw CSV output.
    ///
    /// # Returns
    /// `Some(rows)` when results were requested, `None` otherwise
    ///
    /// # Errors
    /// `QueryFailed` or `Timeout` if the query did not succeed; backend errors
    /// are returned unchanged.
    pub async fn execute_query(
        &self,
        query: &str,
        fetch_results: bool,
    ) -> Result<Option<Vec<RawRow>>> {
        let execution_id = self.start_query(query).await?;
        let execution = self.wait_for_completion(&execution_id).await?;

        if !fetch_results {
            return Ok(None);
        }

        self.read_output(&execution).await.map(Some)
    }

    /// Submit a query and return its execution id
    ///
    /// Submission failures are not retried.
    pub async fn start_query(&self, query: &str) -> Result<String> {
        let execution_id = self
            .backend
            .start_query_execution(query, &self.config.work_group)
            .await?;

        info!(
            "Started query {} in work group {}",
            execution_id, self.config.work_group
        );
        Ok(execution_id)
    }

    /// Fetch the current execution record without waiting
    pub async fn get_execution(&self, execution_id: &str) -> Result<QueryExecution> {
        self.backend.get_query_execution(execution_id).await
    }

    /// Poll a query until it reaches a terminal state
    ///
    /// The first status check is followed by at most `max_retries` re-checks
    /// when `max_retries` is positive; otherwise polling never gives up.
    /// Checks are spaced by the fixed `poll_interval`.
    ///
    /// # Returns
    /// The final execution record of a SUCCEEDED query
    pub async fn wait_for_completion(&self, execution_id: &str) -> Result<QueryExecution> {
        let mut attempts: u64 = 0;

        loop {
            let execution = self.backend.get_query_execution(execution_id).await?;
            attempts += 1;

            let state = execution.status.state;
            debug!(
                "Query {} is {} (status check {})",
                execution_id, state, attempts
            );

            if state == QueryState::Succeeded {
                info!("Query {} succeeded", execution_id);
                return Ok(execution);
            }

            if state.is_terminal() {
                let reason = execution.status.state_change_reason.unwrap_or_default();
                warn!("Query {} finished in state {}: {}", execution_id, state, reason);
                return Err(ClientError::QueryFailed {
                    execution_id: execution_id.to_string(),
                    state,
                    reason,
                });
            }

            if self.retries_exhausted(attempts) {
                warn!(
                    "Query {} still {} after {} status checks, giving up",
                    execution_id, state, attempts
                );
                return Err(ClientError::Timeout {
                    execution_id: execution_id.to_string(),
                    attempts,
                });
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    fn retries_exhausted(&self, attempts: u64) -> bool {
        // The first check is not a retry
        self.config.has_retry_limit() && attempts > self.config.max_retries as u64
    }

    // =============================================================================
    // Results
    // =============================================================================

    /// Download the raw CSV output of a finished query
    ///
    /// Fetches the execution record again to find its output location.
    pub async fn fetch_raw_results(&self, execution_id: &str) -> Result<Vec<RawRow>> {
        let execution = self.backend.get_query_execution(execution_id).await?;
        self.read_output(&execution).await
    }

    /// Typed, paginated access to a query's results
    pub fn results(&self, execution_id: impl Into<String>) -> ResultReader {
        ResultReader::new(Arc::clone(&self.backend), execution_id)
    }

    async fn read_output(&self, execution: &QueryExecution) -> Result<Vec<RawRow>> {
        let location = execution.output_location().ok_or_else(|| {
            ClientError::MissingOutputLocation(execution.query_execution_id.clone())
        })?;
        let location = ObjectLocation::parse(location)?;

        debug!(
            "Reading output of query {} from {}",
            execution.query_execution_id, location
        );
        let body = self.store.get_object(&location).await?;
        let text = String::from_utf8(body).map_err(|e| {
            ClientError::ParseError(format!("Query output at {} is not UTF-8: {}", location, e))
        })?;

        csv::parse_records(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeQueryBackend, InMemoryObjectStore};
    use std::time::Duration;

    const OUTPUT: &str = "s3://fake-results-bucket/execution.csv";

    fn test_config(max_retries: i64) -> ClientConfig {
        ClientConfig::default()
            .with_poll_interval(Duration::ZERO)
            .with_max_retries(max_retries)
    }

    fn client(
        backend: &Arc<FakeQueryBackend>,
        store: &Arc<InMemoryObjectStore>,
        max_retries: i64,
    ) -> QueryClient {
        QueryClient::new(backend.clone(), store.clone(), test_config(max_retries))
    }

    fn succeeding_backend() -> Arc<FakeQueryBackend> {
        Arc::new(
            FakeQueryBackend::new()
                .with_states([QueryState::Queued, QueryState::Running, QueryState::Succeeded])
                .with_output_location(OUTPUT),
        )
    }

    #[tokio::test]
    async fn test_execute_query_without_results() {
        let backend = succeeding_backend();
        let store = Arc::new(InMemoryObjectStore::new());

        let result = client(&backend, &store, 120)
            .execute_query("SELECT 1", false)
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(backend.status_requests(), 3);

        let submissions = backend.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].query_string, "SELECT 1");
        assert_eq!(submissions[0].work_group, "primary");
    }

    #[tokio::test]
    async fn test_execute_query_fetches_raw_rows() {
        let backend = succeeding_backend();
        let store = Arc::new(InMemoryObjectStore::new());
        store
            .put_rows(OUTPUT, &[vec!["1", "hello, world"], vec!["2", "plain"]])
            .unwrap();

        let rows = client(&backend, &store, 120)
            .execute_query("SELECT 1", true)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            rows,
            vec![
                vec!["1".to_string(), "hello, world".to_string()],
                vec!["2".to_string(), "plain".to_string()],
            ]
        );
    }

    #[tokio::test]
    async fn test_custom_work_group() {
        let backend = succeeding_backend();
        let store = Arc::new(InMemoryObjectStore::new());
        let config = test_config(5).with_work_group("analytics");

        QueryClient::new(backend.clone(), store, config)
            .execute_query("SELECT 1", false)
            .await
            .unwrap();

        assert_eq!(backend.submissions()[0].work_group, "analytics");
    }

    #[tokio::test]
    async fn test_succeeds_on_last_allowed_check() {
        let backend = succeeding_backend();
        let store = Arc::new(InMemoryObjectStore::new());

        let result = client(&backend, &store, 2)
            .execute_query("SELECT 1", false)
            .await;

        assert!(result.is_ok());
        assert_eq!(backend.status_requests(), 3);
    }

    #[tokio::test]
    async fn test_timeout_when_never_terminal() {
        let backend = Arc::new(FakeQueryBackend::new().with_states([QueryState::Running]));
        let store = Arc::new(InMemoryObjectStore::new());

        let err = client(&backend, &store, 3)
            .execute_query("SELECT 1", false)
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(err.is_query_error());
        assert!(matches!(err, ClientError::Timeout { attempts: 4, .. }));
        assert_eq!(backend.status_requests(), 4);
    }

    #[tokio::test]
    async fn test_timeout_with_single_retry_budget() {
        let backend = succeeding_backend();
        let store = Arc::new(InMemoryObjectStore::new());

        let err = client(&backend, &store, 1)
            .execute_query("SELECT 1", false)
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(backend.status_requests(), 2);
    }

    #[tokio::test]
    async fn test_unlimited_retries_keep_polling() {
        let store = Arc::new(InMemoryObjectStore::new());

        for max_retries in [0, -1] {
            let mut states = vec![QueryState::Running; 250];
            states.push(QueryState::Succeeded);
            let backend = Arc::new(FakeQueryBackend::new().with_states(states));

            let result = client(&backend, &store, max_retries)
                .execute_query("SELECT 1", false)
                .await;

            assert!(result.is_ok());
            assert_eq!(backend.status_requests(), 251);
        }
    }

    #[tokio::test]
    async fn test_failed_query_carries_reason() {
        let backend = Arc::new(
            FakeQueryBackend::new()
                .with_states([QueryState::Queued, QueryState::Running, QueryState::Failed])
                .with_state_change_reason("state change reason"),
        );
        let store = Arc::new(InMemoryObjectStore::new());

        let err = client(&backend, &store, 120)
            .execute_query("SELECT 1", true)
            .await
            .unwrap_err();

        match err {
            ClientError::QueryFailed { state, reason, .. } => {
                assert_eq!(state, QueryState::Failed);
                assert_eq!(reason, "state change reason");
            }
            other => panic!("expected QueryFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancelled_query_is_query_error() {
        let backend = Arc::new(FakeQueryBackend::new().with_states([QueryState::Cancelled]));
        let store = Arc::new(InMemoryObjectStore::new());

        let err = client(&backend, &store, 120)
            .execute_query("SELECT 1", false)
            .await
            .unwrap_err();

        assert!(err.is_query_error());
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_backend_errors_propagate_unchanged() {
        // No scripted states: the first status check fails at the backend
        let backend = Arc::new(FakeQueryBackend::new());
        let store = Arc::new(InMemoryObjectStore::new());

        let err = client(&backend, &store, 120)
            .execute_query("SELECT 1", false)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(!err.is_query_error());
    }

    #[tokio::test]
    async fn test_missing_output_location() {
        let backend = Arc::new(FakeQueryBackend::new().with_states([QueryState::Succeeded]));
        let store = Arc::new(InMemoryObjectStore::new());

        let err = client(&backend, &store, 120)
            .execute_query("SELECT 1", true)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::MissingOutputLocation(_)));
    }

    #[tokio::test]
    async fn test_fetch_raw_results_refetches_execution() {
        let backend = Arc::new(
            FakeQueryBackend::new()
                .with_states([QueryState::Succeeded])
                .with_output_location(OUTPUT),
        );
        let store = Arc::new(InMemoryObjectStore::new());
        store.put(OUTPUT, "a,b\n").unwrap();

        let rows = client(&backend, &store, 120)
            .fetch_raw_results("execution")
            .await
            .unwrap();

        assert_eq!(rows, vec![vec!["a".to_string(), "b".to_string()]]);
        assert_eq!(backend.status_requests(), 1);
    }
}
