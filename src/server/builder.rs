//! Server builder and run_server function
//!
//! This module provides the ServerBuilder for easier server configuration
//! and the run_server function for automatic configuration loading.

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::utils::error::{Result, TrackerError};
use tracing::info;

/// Server builder for easier configuration
pub struct ServerBuilder {
    config: Option<Config>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self { config: None }
    }

    /// Set configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the HTTP server
    pub async fn build(self) -> Result<HttpServer> {
        let config = self
            .config
            .ok_or_else(|| TrackerError::Config("Configuration is required".to_string()))?;

        HttpServer::new(&config).await
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the server with automatic configuration loading
pub async fn run_server() -> Result<()> {
    info!("Starting itemflow tracker");

    dotenvy::dotenv().ok();

    let config_path =
        std::env::var("TRACKER_CONFIG").unwrap_or_else(|_| "config/tracker.yaml".to_string());
    info!("Loading configuration file: {}", config_path);

    let config = match Config::from_file(&config_path).await {
        Ok(config) => {
            info!("Configuration file loaded successfully");
            config
        }
        Err(e) => {
            info!(
                "Configuration file loading failed ({}), falling back to environment",
                e
            );
            Config::from_env()?
        }
    };

    let server = HttpServer::new(&config).await?;
    info!(
        "Server starting at: http://{}",
        config.server().address()
    );
    info!("API Endpoints:");
    info!("   GET    /items - List items");
    info!("   POST   /items - Create item");
    info!("   GET    /items/{{id}} - Fetch item");
    info!("   PUT    /items/{{id}} - Update item");
    info!("   DELETE /items/{{id}} - Delete item");
    info!("   GET    /items/process - Process all items");
    info!("   GET    /health - Health check");

    server.start().await
}
