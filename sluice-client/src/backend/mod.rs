//! Backend layer
//!
//! The query service and the object store are external collaborators. The
//! client only talks to them through the traits defined here, which keeps the
//! polling and parsing logic independent of transport. See [`crate::fake`]
//! for in-memory implementations.

mod http;
mod object_store;

pub use http::HttpQueryBackend;
pub use object_store::HttpObjectStore;

use async_trait::async_trait;
use reqwest::Url;
use sluice_core::domain::query::QueryExecution;
use sluice_core::domain::results::ResultPage;

use crate::error::{ClientError, Result};

/// Operations consumed from the managed query service
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Submits a query and returns the execution id issued for it
    ///
    /// # Arguments
    /// * `query` - The query text
    /// * `work_group` - Execution group the query runs in
    async fn start_query_execution(&self, query: &str, work_group: &str) -> Result<String>;

    /// Fetches the current execution record
    async fn get_query_execution(&self, execution_id: &str) -> Result<QueryExecution>;

    /// Fetches one page of results
    ///
    /// # Arguments
    /// * `execution_id` - The execution whose results are read
    /// * `next_token` - Continuation token from the previous page, `None` for the first
    async fn get_query_results(
        &self,
        execution_id: &str,
        next_token: Option<&str>,
    ) -> Result<ResultPage>;
}

/// Read access to the object store holding raw query output
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Downloads the full content of an object
    async fn get_object(&self, location: &ObjectLocation) -> Result<Vec<u8>>;
}

/// A bucket/key pair parsed from an output location such as `s3://bucket/path/out.csv`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    /// Parses a `scheme://bucket/key` location
    pub fn parse(location: &str) -> Result<Self> {
        let url = Url::parse(location)
            .map_err(|e| ClientError::InvalidLocation(format!("{}: {}", location, e)))?;

        let bucket = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| ClientError::InvalidLocation(format!("{}: missing bucket", location)))?
            .to_string();

        let key = url.path().trim_start_matches('/').to_string();
        if key.is_empty() {
            return Err(ClientError::InvalidLocation(format!(
                "{}: missing object key",
                location
            )));
        }

        Ok(Self { bucket, key })
    }
}

impl std::fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Appends path segments to a base URL, keeping any path the base already has
pub(crate) fn join_url<'a>(
    base: &str,
    segments: impl IntoIterator<Item = &'a str>,
) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| ClientError::InvalidRequest(format!("Invalid base URL {}: {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidRequest(format!("Base URL {} cannot have a path", base)))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}
