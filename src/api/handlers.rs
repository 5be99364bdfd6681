//! API Handlers
//!
//! HTTP request handlers for the order read surface.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::cache::RecordCache;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{HealthResponse, Order, StatsResponse};
use crate::storage::RecordStore;

/// The process-wide order cache.
pub type OrderCache = RecordCache<Order>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared order cache
    pub cache: Arc<OrderCache>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: Arc<OrderCache>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState with a fresh cache over `store`.
    pub fn from_config(config: &Config, store: Arc<dyn RecordStore<Order>>) -> Self {
        Self::new(Arc::new(RecordCache::new(store, config.cache_capacity)))
    }
}

/// Handler for GET /order/:uid
///
/// Returns the order as JSON, reading through to the store on a miss.
pub async fn get_order_handler(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<Order>> {
    if Uuid::parse_str(&uid).is_err() {
        return Err(CacheError::InvalidRequest(
            "UID is invalid or missing".to_string(),
        ));
    }

    let order = state.cache.get(&uid).await?;
    Ok(Json(order))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    Json(StatsResponse::new(&stats, state.cache.capacity()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
