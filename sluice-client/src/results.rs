//! Paginated, typed result retrieval
//!
//! Reads results through the query service's own paging API rather than the
//! raw output object. Each page carries its column schema, so every row can be
//! coerced to typed values. The service repeats the header row (column names)
//! in the data; those rows are dropped.

use sluice_core::domain::results::{ColumnInfo, ResultPage, Row};
use std::sync::Arc;
use tracing::debug;

use crate::backend::QueryBackend;
use crate::coerce::coerce_row;
use crate::error::Result;

/// Reader over all result pages of one query execution
#[derive(Clone)]
pub struct ResultReader {
    backend: Arc<dyn QueryBackend>,
    execution_id: String,
}

impl ResultReader {
    /// Creates a reader for an execution's results
    pub fn new(backend: Arc<dyn QueryBackend>, execution_id: impl Into<String>) -> Self {
        Self {
            backend,
            execution_id: execution_id.into(),
        }
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    /// Fetches every page and returns all data rows, in page order
    ///
    /// The continuation token of each page is passed to the next request until
    /// the service stops returning one.
    pub async fn fetch_all(&self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        let mut next_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .backend
                .get_query_results(&self.execution_id, next_token.as_deref())
                .await?;
            pages += 1;

            let parsed = Self::parse_page(&page)?;
            debug!(
                "Parsed {} row(s) from page {} of query {}",
                parsed.len(),
                pages,
                self.execution_id
            );
            rows.extend(parsed);

            match page.next_token.filter(|token| !token.is_empty()) {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Ok(rows)
    }

    /// Coerces the data rows of a single page, skipping header rows
    pub fn parse_page(page: &ResultPage) -> Result<Vec<Row>> {
        page.rows
            .iter()
            .filter(|values| !is_header_row(values, &page.columns))
            .map(|values| coerce_row(values, &page.columns))
            .collect()
    }
}

/// A row is a header when every field equals its column's name
pub fn is_header_row(values: &[Option<String>], columns: &[ColumnInfo]) -> bool {
    values.len() == columns.len()
        && values
            .iter()
            .zip(columns)
            .all(|(value, column)| value.as_deref() == Some(column.name.as_str()))
}
