//! HTTP server core implementation
//!
//! This module provides the HttpServer struct and its core methods. It is
//! the application's composition root: the store, the worker pool, and the
//! batch processor are constructed here and their lifecycle is owned here.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    App, HttpServer as ActixHttpServer,
    middleware::DefaultHeaders,
    web,
};
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::config::{Config, ProcessingConfig, ServerConfig};
use crate::core::processing::WorkerPool;
use crate::server::routes;
use crate::server::state::AppState;
use crate::storage::{Database, ItemStore};
use crate::utils::error::{Result, TrackerError};

/// HTTP server
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Processing configuration
    processing: ProcessingConfig,
    /// Application state
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");

        let database = Database::new(config.database()).await?;
        database.migrate().await?;
        let store: Arc<dyn ItemStore> = Arc::new(database);

        let pool = Arc::new(WorkerPool::new(config.processing().pool_capacity()));
        info!(capacity = pool.capacity(), "worker pool started");

        let state = AppState::new(config.clone(), store, pool);

        Ok(Self {
            config: config.server().clone(),
            processing: config.processing().clone(),
            state,
        })
    }

    /// Create the Actix-web application
    fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let cors_config = &state.config.server().cors;
        let mut cors = Cors::default();

        if cors_config.enabled {
            if cors_config.allows_all_origins() {
                cors = cors.allow_any_origin();
            } else {
                for origin in &cors_config.allowed_origins {
                    cors = cors.allowed_origin(origin);
                }
            }
            cors = cors.allow_any_method().allow_any_header();
        }

        App::new()
            .app_data(state)
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(DefaultHeaders::new().add(("Server", "itemflow")))
            .configure(routes::items::configure_routes)
            .configure(routes::health::configure_routes)
    }

    /// Start the HTTP server
    ///
    /// Blocks until the server exits, then drains the worker pool within the
    /// configured shutdown timeout.
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();
        let workers = self.config.worker_count();
        let shutdown_timeout = self.processing.shutdown_timeout();
        let pool = Arc::clone(&self.state.pool);

        info!("Starting HTTP server on {}", bind_addr);

        let state = web::Data::new(self.state);

        let server = ActixHttpServer::new(move || Self::create_app(state.clone()))
            .workers(workers)
            .bind(&bind_addr)
            .map_err(|e| {
                TrackerError::Config(format!("Failed to bind {}: {}", bind_addr, e))
            })?
            .run();

        info!("HTTP server listening on {}", bind_addr);

        server
            .await
            .map_err(|e| TrackerError::Internal(format!("Server error: {}", e)))?;

        pool.shutdown(shutdown_timeout).await;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
