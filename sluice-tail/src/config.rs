//! Tailer configuration
//!
//! Defines how much is read per iteration and how long the tailer sleeps when
//! the file has no new data.

use std::time::Duration;

/// Tailer configuration
#[derive(Debug, Clone)]
pub struct TailConfig {
    /// Maximum number of bytes read per iteration
    pub chunk_size: usize,

    /// How long to wait before re-reading once the end of the file is reached
    pub poll_interval: Duration,
}

impl TailConfig {
    /// Creates a new configuration with defaults
    pub fn new() -> Self {
        Self {
            chunk_size: 1024,
            poll_interval: Duration::from_millis(100),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Recognized environment variables:
    /// - SLUICE_TAIL_CHUNK_SIZE (optional, bytes, default: 1024)
    /// - SLUICE_TAIL_POLL_INTERVAL_MS (optional, milliseconds, default: 100)
    pub fn from_env() -> Self {
        let defaults = Self::new();

        let chunk_size = std::env::var("SLUICE_TAIL_CHUNK_SIZE")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.chunk_size);

        let poll_interval = std::env::var("SLUICE_TAIL_POLL_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);

        Self {
            chunk_size,
            poll_interval,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chunk_size == 0 {
            anyhow::bail!("chunk_size must be greater than 0");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        Ok(())
    }
}

impl Default for TailConfig {
    fn default() -> Self {
        Self::new()
    }
}
