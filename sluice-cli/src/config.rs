//! Configuration module
//!
//! Handles CLI configuration: service endpoints and polling behavior.

use anyhow::{Context, Result};
use sluice_client::ClientConfig;
use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the query service
    pub endpoint: String,

    /// URL of the object store holding result files
    pub object_store_endpoint: String,

    pub work_group: String,

    pub poll_interval_secs: u64,

    pub max_retries: i64,
}

impl Config {
    /// Builds a validated client configuration
    pub fn client_config(&self) -> Result<ClientConfig> {
        let config = ClientConfig::new(self.endpoint.clone(), self.object_store_endpoint.clone())
            .with_work_group(self.work_group.clone())
            .with_poll_interval(Duration::from_secs(self.poll_interval_secs))
            .with_max_retries(self.max_retries);

        config.validate().context("Invalid client configuration")?;
        Ok(config)
    }
}
