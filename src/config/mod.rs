//! Configuration management for the tracker
//!
//! This module handles loading and validation of all service configuration.

pub mod models;

pub use models::*;

use crate::utils::error::{Result, TrackerError};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the tracker
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Tracker configuration
    pub tracker: TrackerConfig,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| TrackerError::Config(format!("Failed to read config file: {}", e)))?;

        let tracker: TrackerConfig = serde_yaml::from_str(&content)
            .map_err(|e| TrackerError::Config(format!("Failed to parse config: {}", e)))?;

        let config = Self { tracker };
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let tracker = TrackerConfig::from_env()?;
        let config = Self { tracker };

        config.validate()?;
        Ok(config)
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.tracker.server
    }

    /// Get database configuration
    pub fn database(&self) -> &DatabaseConfig {
        &self.tracker.database
    }

    /// Get processing configuration
    pub fn processing(&self) -> &ProcessingConfig {
        &self.tracker.processing
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.tracker
            .server
            .validate()
            .map_err(|e| TrackerError::Config(format!("Server config error: {}", e)))?;

        self.tracker
            .database
            .validate()
            .map_err(|e| TrackerError::Config(format!("Database config error: {}", e)))?;

        self.tracker
            .processing
            .validate()
            .map_err(|e| TrackerError::Config(format!("Processing config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server().port, 8080);
    }

    #[test]
    fn test_yaml_round_trip() {
        let yaml = r#"
server:
  host: 127.0.0.1
  port: 9090
database:
  url: "sqlite::memory:"
  max_connections: 1
processing:
  workers: 4
  shutdown_timeout_secs: 5
"#;
        let tracker: TrackerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(tracker.server.host, "127.0.0.1");
        assert_eq!(tracker.server.port, 9090);
        assert_eq!(tracker.database.max_connections, 1);
        assert_eq!(tracker.processing.pool_capacity(), 4);
        assert_eq!(tracker.processing.shutdown_timeout_secs, 5);
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = Config::default();
        config.tracker.server.port = 0;
        assert!(config.validate().is_err());
    }
}
