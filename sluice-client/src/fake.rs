//! In-memory backends
//!
//! Scripted stand-ins for the query service and object store. They record
//! every call so tests (here and in downstream crates) can assert on the
//! exact conversation the client had with its collaborators.

use async_trait::async_trait;
use sluice_core::domain::query::{QueryExecution, QueryState, QueryStatus, ResultConfiguration};
use sluice_core::domain::results::ResultPage;
use sluice_core::dto::query::StartQueryExecution;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use crate::backend::{ObjectLocation, ObjectStore, QueryBackend};
use crate::csv::format_record;
use crate::error::{ClientError, Result};

/// Query backend that replays a scripted sequence of states and result pages
///
/// Each status request consumes the next scripted state; once the script is
/// exhausted the last state repeats forever.
#[derive(Debug, Default)]
pub struct FakeQueryBackend {
    state: Mutex<FakeState>,
}

#[derive(Debug, Default)]
struct FakeState {
    states: VecDeque<QueryState>,
    last_state: Option<QueryState>,
    state_change_reason: Option<String>,
    output_location: Option<String>,
    pages: VecDeque<ResultPage>,
    submissions: Vec<StartQueryExecution>,
    status_requests: Vec<String>,
    page_requests: Vec<(String, Option<String>)>,
}

impl FakeQueryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends states to the status script
    pub fn with_states(self, states: impl IntoIterator<Item = QueryState>) -> Self {
        self.lock().states.extend(states);
        self
    }

    /// Reason attached to every status response
    pub fn with_state_change_reason(self, reason: impl Into<String>) -> Self {
        self.lock().state_change_reason = Some(reason.into());
        self
    }

    /// Output location reported once the query succeeded
    pub fn with_output_location(self, location: impl Into<String>) -> Self {
        self.lock().output_location = Some(location.into());
        self
    }

    /// Appends a page to the results script
    pub fn with_page(self, page: ResultPage) -> Self {
        self.lock().pages.push_back(page);
        self
    }

    /// Every query submitted so far
    pub fn submissions(&self) -> Vec<StartQueryExecution> {
        self.lock().submissions.clone()
    }

    /// Number of status requests served so far
    pub fn status_requests(&self) -> usize {
        self.lock().status_requests.len()
    }

    /// Execution id and continuation token of every results request
    pub fn page_requests(&self) -> Vec<(String, Option<String>)> {
        self.lock().page_requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl QueryBackend for FakeQueryBackend {
    async fn start_query_execution(&self, query: &str, work_group: &str) -> Result<String> {
        self.lock().submissions.push(StartQueryExecution {
            query_string: query.to_string(),
            work_group: work_group.to_string(),
        });

        Ok(uuid::Uuid::new_v4().to_string())
    }

    async fn get_query_execution(&self, execution_id: &str) -> Result<QueryExecution> {
        let mut state = self.lock();
        state.status_requests.push(execution_id.to_string());

        let current = match state.states.pop_front() {
            Some(next) => {
                state.last_state = Some(next);
                next
            }
            None => state.last_state.ok_or_else(|| {
                ClientError::NotFound(format!("No scripted state for query {}", execution_id))
            })?,
        };

        let result_configuration = match current {
            QueryState::Succeeded => Some(ResultConfiguration {
                output_location: state.output_location.clone(),
            }),
            _ => None,
        };

        Ok(QueryExecution {
            query_execution_id: execution_id.to_string(),
            status: QueryStatus {
                state: current,
                state_change_reason: state.state_change_reason.clone(),
            },
            result_configuration,
        })
    }

    async fn get_query_results(
        &self,
        execution_id: &str,
        next_token: Option<&str>,
    ) -> Result<ResultPage> {
        let mut state = self.lock();
        state
            .page_requests
            .push((execution_id.to_string(), next_token.map(str::to_string)));

        state.pages.pop_front().ok_or_else(|| {
            ClientError::NotFound(format!("No scripted result page for query {}", execution_id))
        })
    }
}

/// Object store that keeps objects in memory
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<ObjectLocation, Vec<u8>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an object at a `scheme://bucket/key` location
    pub fn put(&self, location: &str, body: impl Into<Vec<u8>>) -> Result<()> {
        let location = ObjectLocation::parse(location)?;
        self.lock().insert(location, body.into());
        Ok(())
    }

    /// Stores rows the way the query service writes its CSV output
    pub fn put_rows<S: AsRef<str>>(&self, location: &str, rows: &[Vec<S>]) -> Result<()> {
        let body: String = rows
            .iter()
            .map(|row| format!("{}\n", format_record(row)))
            .collect();
        self.put(location, body)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ObjectLocation, Vec<u8>>> {
        self.objects.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get_object(&self, location: &ObjectLocation) -> Result<Vec<u8>> {
        self.lock()
            .get(location)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(location.to_string()))
    }
}
