//! HTTP object store
//!
//! Downloads raw query output with path-style requests:
//! `GET {endpoint}/{bucket}/{key}`.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{ObjectLocation, ObjectStore, join_url};
use crate::error::{ClientError, Result};

/// HTTP implementation of ObjectStore
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    endpoint: String,
    client: Client,
}

impl HttpObjectStore {
    /// Creates a new HTTP object store client
    ///
    /// # Arguments
    /// * `endpoint` - Base URL of the object store (e.g., "http://localhost:9000")
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn get_object(&self, location: &ObjectLocation) -> Result<Vec<u8>> {
        let segments = std::iter::once(location.bucket.as_str()).chain(location.key.split('/'));
        let url = join_url(&self.endpoint, segments)?;

        debug!("Downloading object {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(ClientError::NotFound(location.to_string()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_trims_trailing_slash() {
        let store = HttpObjectStore::new("http://localhost:9000/");
        assert_eq!(store.endpoint(), "http://localhost:9000");
    }
}
