//! Client configuration
//!
//! Defines where the query service and object store live, which work group
//! queries run in, and how status polling behaves.

use std::time::Duration;

/// Query client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Query service base URL (e.g., "http://localhost:8080")
    pub endpoint: String,

    /// Object store base URL used to download raw query output
    pub object_store_endpoint: String,

    /// Execution group every query is submitted to
    pub work_group: String,

    /// Fixed wait between status checks
    pub poll_interval: Duration,

    /// Maximum number of status re-checks; zero or negative polls forever
    pub max_retries: i64,
}

impl ClientConfig {
    /// Creates a new configuration with defaults
    pub fn new(endpoint: String, object_store_endpoint: String) -> Self {
        Self {
            endpoint,
            object_store_endpoint,
            work_group: "primary".to_string(),
            poll_interval: Duration::from_secs(5),
            max_retries: 120,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Recognized environment variables:
    /// - SLUICE_QUERY_ENDPOINT (optional, default: http://localhost:8080)
    /// - SLUICE_OBJECT_STORE_ENDPOINT (optional, default: http://localhost:9000)
    /// - SLUICE_WORK_GROUP (optional, default: primary)
    /// - SLUICE_POLL_INTERVAL (optional, seconds, default: 5)
    /// - SLUICE_MAX_RETRIES (optional, default: 120)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let endpoint = std::env::var("SLUICE_QUERY_ENDPOINT").unwrap_or(defaults.endpoint);

        let object_store_endpoint = std::env::var("SLUICE_OBJECT_STORE_ENDPOINT")
            .unwrap_or(defaults.object_store_endpoint);

        let work_group = std::env::var("SLUICE_WORK_GROUP").unwrap_or(defaults.work_group);

        let poll_interval = std::env::var("SLUICE_POLL_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_interval);

        let max_retries = std::env::var("SLUICE_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(defaults.max_retries);

        Self {
            endpoint,
            object_store_endpoint,
            work_group,
            poll_interval,
            max_retries,
        }
    }

    pub fn with_work_group(mut self, work_group: impl Into<String>) -> Self {
        self.work_group = work_group.into();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_retries(mut self, max_retries: i64) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Whether status polling has a finite retry budget
    pub fn has_retry_limit(&self) -> bool {
        self.max_retries > 0
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, url) in [
            ("endpoint", &self.endpoint),
            ("object_store_endpoint", &self.object_store_endpoint),
        ] {
            if url.is_empty() {
                anyhow::bail!("{} cannot be empty", name);
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        if self.work_group.trim().is_empty() {
            anyhow::bail!("work_group cannot be empty");
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(
            "http://localhost:8080".to_string(),
            "http://localhost:9000".to_string(),
        )
    }
}
