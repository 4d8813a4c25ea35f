//! Shared test infrastructure
//!
//! Builders for application state backed by the in-memory store, so HTTP
//! tests run without a database.

use std::sync::Arc;

use itemflow::config::Config;
use itemflow::core::processing::WorkerPool;
use itemflow::server::state::AppState;
use itemflow::storage::memory::InMemoryStore;

/// Build an AppState backed by the in-memory store
pub fn test_state() -> AppState {
    let store = Arc::new(InMemoryStore::new());
    let pool = Arc::new(WorkerPool::new(4));
    AppState::new(Config::default(), store, pool)
}

/// Minimal valid item request body
pub fn item_body(name: &str, email: &str) -> serde_json::Value {
    serde_json::json!({ "name": name, "email": email })
}
