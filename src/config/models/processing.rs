//! Batch processing configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Batch processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Worker pool capacity (defaults to the number of CPUs)
    pub workers: Option<usize>,
    /// How long a graceful pool shutdown waits for in-flight tasks
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            workers: None,
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl ProcessingConfig {
    /// Get the worker pool capacity (defaults to CPU count)
    pub fn pool_capacity(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }

    /// Get the shutdown timeout as a duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Validate processing configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err("Worker pool capacity cannot be 0".to_string());
            }
        }

        if self.shutdown_timeout_secs == 0 {
            return Err("shutdown_timeout_secs cannot be 0".to_string());
        }

        Ok(())
    }
}

fn default_shutdown_timeout_secs() -> u64 {
    60
}
