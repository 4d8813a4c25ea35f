//! Work item endpoints
//!
//! CRUD routes plus the bulk processing trigger. Bodies are plain domain
//! JSON; failures surface through the error envelope via `ResponseError`.

use actix_web::{HttpResponse, web};
use tracing::warn;

use crate::core::items::ItemDraft;
use crate::server::state::AppState;
use crate::utils::error::{Result, TrackerError};

/// Configure item routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/items")
            .route("", web::get().to(list_items))
            .route("", web::post().to(create_item))
            // Registered ahead of the dynamic routes so "process" is never
            // captured as an item id.
            .route("/process", web::get().to(process_items))
            .route("/{id}", web::get().to(get_item))
            .route("/{id}", web::put().to(update_item))
            .route("/{id}", web::delete().to(delete_item)),
    );
}

/// List all items
async fn list_items(state: web::Data<AppState>) -> Result<HttpResponse> {
    let items = state.items.find_all().await?;
    Ok(HttpResponse::Ok().json(items))
}

/// Create a new item
async fn create_item(
    state: web::Data<AppState>,
    draft: web::Json<ItemDraft>,
) -> Result<HttpResponse> {
    let item = state.items.create(draft.into_inner()).await?;
    Ok(HttpResponse::Created().json(item))
}

/// Fetch a single item
async fn get_item(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse> {
    let id = path.into_inner();
    match state.items.find_by_id(id).await? {
        Some(item) => Ok(HttpResponse::Ok().json(item)),
        None => Err(TrackerError::NotFound(format!("item {} not found", id))),
    }
}

/// Update an existing item
async fn update_item(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    draft: web::Json<ItemDraft>,
) -> Result<HttpResponse> {
    let item = state.items.update(path.into_inner(), draft.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

/// Delete an item
async fn delete_item(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse> {
    state.items.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Process all items through the worker pool
///
/// A run with partial failures still answers 200 with the successfully
/// processed items; per-item failures are logged and stay available on the
/// aggregate report for in-process callers.
async fn process_items(state: web::Data<AppState>) -> Result<HttpResponse> {
    let report = state.processor.process_all().await?;
    if !report.is_complete() {
        warn!(
            failed = report.failures.len(),
            "batch processing finished with failures"
        );
    }
    Ok(HttpResponse::Ok().json(report.processed))
}
