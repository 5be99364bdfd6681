//! End-to-end tests over a real TCP listener
//!
//! Runs the router on an ephemeral port, feeds orders through the
//! ingestion pipeline and reads them back with an HTTP client.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use order_cache::{
    api::create_router,
    cache::RecordCache,
    models::Order,
    spawn_ingest_workers, spawn_line_reader,
    storage::{MemoryStore, RecordStore},
    AppState, OrderCache,
};
use reqwest::StatusCode;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

const UID: &str = "e7a1b2c3-d4e5-4f60-8a7b-9c0d1e2f3a4b";

fn order_json(uid: &str) -> String {
    serde_json::json!({
        "order_uid": uid,
        "track_number": "WBILMTESTTRACK",
        "entry": "WBIL",
        "delivery": {
            "name": "Test Testov",
            "phone": "+9720000000",
            "zip": "2639809",
            "city": "Kiryat Mozkin",
            "address": "Ploshad Mira 15",
            "region": "Kraiot",
            "email": "test@gmail.com"
        },
        "payment": {
            "transaction": uid,
            "request_id": "",
            "currency": "USD",
            "provider": "wbpay",
            "amount": 1817,
            "payment_dt": 1637907727,
            "bank": "alpha",
            "delivery_cost": 1500,
            "goods_total": 317,
            "custom_fee": 0
        },
        "items": [{
            "chrt_id": 9934930,
            "track_number": "WBILMTESTTRACK",
            "price": 453,
            "rid": "ab4219087a764ae0btest",
            "name": "Mascaras",
            "sale": 30,
            "size": "0",
            "total_price": 317,
            "nm_id": 2389212,
            "brand": "Vivienne Sabo",
            "status": 202
        }],
        "locale": "en",
        "internal_signature": "",
        "customer_id": "test",
        "delivery_service": "meest",
        "shardkey": "9",
        "sm_id": 99,
        "date_created": "2021-11-26T06:22:19Z",
        "oof_shard": "1"
    })
    .to_string()
}

async fn serve(cache: Arc<OrderCache>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_router(AppState::new(cache));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_ingested_order_is_served_over_http() {
    let store = Arc::new(MemoryStore::<Order>::new());
    let cache: Arc<OrderCache> = Arc::new(RecordCache::new(store.clone(), 10));
    let base = serve(cache.clone()).await;

    let input = format!("{}\nnot json\n", order_json(UID));
    let (tx, rx) = mpsc::channel(8);
    let reader = spawn_line_reader(Cursor::new(input.into_bytes()), tx);
    let workers = spawn_ingest_workers(cache.clone(), rx, 2);

    reader.await.unwrap();
    for worker in workers {
        worker.await.unwrap();
    }

    // Written through to the store as well as cached
    assert!(store.get_by_key(UID).await.unwrap().is_some());

    let response = reqwest::get(format!("{}/order/{}", base, UID)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let order: Order = response.json().await.unwrap();
    assert_eq!(order.order_uid, UID);
    assert_eq!(order.items[0].brand, "Vivienne Sabo");
}

#[tokio::test]
async fn test_unknown_order_over_http() {
    let cache: Arc<OrderCache> = Arc::new(RecordCache::new(Arc::new(MemoryStore::<Order>::new()), 10));
    let base = serve(cache).await;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let response = client
        .get(format!("{}/order/{}", base, UID))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "order not found");
}
