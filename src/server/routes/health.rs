//! Health check and status endpoints

use actix_web::{HttpResponse, Result as ActixResult, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::server::state::AppState;
use crate::storage::ItemStore;

/// Configure health check routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/health")
            .route("", web::get().to(health_check))
            .route("/detailed", web::get().to(detailed_health_check)),
    );
}

/// Basic health status
#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    timestamp: DateTime<Utc>,
    version: &'static str,
}

/// Detailed health status
#[derive(Debug, Serialize)]
struct DetailedHealthStatus {
    status: &'static str,
    timestamp: DateTime<Utc>,
    version: &'static str,
    database: bool,
    pool: PoolStatus,
    processed_total: u64,
}

/// Worker pool gauges
#[derive(Debug, Serialize)]
struct PoolStatus {
    capacity: usize,
    active: usize,
    shutting_down: bool,
}

/// Basic health check endpoint
///
/// Returns a simple health status indicating if the service is running.
/// This endpoint is typically used by load balancers and monitoring systems.
async fn health_check(_state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    debug!("Health check requested");

    let health_status = HealthStatus {
        status: "healthy",
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
    };

    Ok(HttpResponse::Ok().json(health_status))
}

/// Detailed health check endpoint
///
/// Adds storage reachability and worker pool gauges to the basic status.
async fn detailed_health_check(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    debug!("Detailed health check requested");

    let database = state.store.find_by_id(0).await.is_ok();

    let detailed_status = DetailedHealthStatus {
        status: if database { "healthy" } else { "degraded" },
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        database,
        pool: PoolStatus {
            capacity: state.pool.capacity(),
            active: state.pool.active_count(),
            shutting_down: state.pool.is_shutting_down(),
        },
        processed_total: state.processor.processed_total(),
    };

    Ok(HttpResponse::Ok().json(detailed_status))
}
