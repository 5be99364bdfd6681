//! API Routes
//!
//! Configures the Axum router for the order read surface.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{get_order_handler, health_handler, stats_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /order/:uid` - Fetch an order by UID
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs every request
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/order/:uid", get(get_order_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::OrderCache;
    use crate::cache::RecordCache;
    use crate::models::order::fixtures::order;
    use crate::storage::MemoryStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    const UID: &str = "0b6d5c1e-9f2a-4c7b-8e3d-5a4f6b7c8d9e";

    fn create_test_app() -> Router {
        let store = Arc::new(MemoryStore::from_records(vec![order(UID)]));
        let cache: Arc<OrderCache> = Arc::new(RecordCache::new(store, 100));
        let state = AppState::new(cache);
        create_router(state)
    }

    async fn status_of(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        assert_eq!(status_of(create_test_app(), "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        assert_eq!(status_of(create_test_app(), "/stats").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_order_found() {
        let uri = format!("/order/{}", UID);
        assert_eq!(status_of(create_test_app(), &uri).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_order_not_found() {
        let uri = "/order/11111111-2222-4333-8444-555555555555";
        assert_eq!(status_of(create_test_app(), uri).await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_order_bad_uid() {
        assert_eq!(
            status_of(create_test_app(), "/order/abc").await,
            StatusCode::BAD_REQUEST
        );
    }
}
