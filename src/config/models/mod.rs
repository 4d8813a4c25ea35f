//! Configuration model types

mod processing;
mod server;
mod storage;

pub use processing::ProcessingConfig;
pub use server::{CorsConfig, ServerConfig};
pub use storage::DatabaseConfig;

use crate::utils::error::{Result, TrackerError};
use serde::{Deserialize, Serialize};

/// Top-level tracker configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Batch processing configuration
    #[serde(default)]
    pub processing: ProcessingConfig,
}

impl TrackerConfig {
    /// Build configuration from environment variables, starting from defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("TRACKER_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("TRACKER_PORT") {
            config.server.port = port
                .parse()
                .map_err(|e| TrackerError::Config(format!("Invalid TRACKER_PORT: {}", e)))?;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.url = url;
        }
        if let Ok(workers) = std::env::var("TRACKER_PROCESSING_WORKERS") {
            config.processing.workers = Some(workers.parse().map_err(|e| {
                TrackerError::Config(format!("Invalid TRACKER_PROCESSING_WORKERS: {}", e))
            })?);
        }
        if let Ok(timeout) = std::env::var("TRACKER_SHUTDOWN_TIMEOUT_SECS") {
            config.processing.shutdown_timeout_secs = timeout.parse().map_err(|e| {
                TrackerError::Config(format!("Invalid TRACKER_SHUTDOWN_TIMEOUT_SECS: {}", e))
            })?;
        }

        Ok(config)
    }
}
