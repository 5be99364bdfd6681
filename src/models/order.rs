//! Order model
//!
//! The record type served by the cache: an order as delivered by the
//! ingestion pipeline and returned by `GET /order/:uid`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::MAX_KEY_LENGTH;
use crate::storage::Record;

/// A customer order, keyed by `order_uid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_uid: String,
    pub track_number: String,
    pub entry: String,
    pub delivery: Delivery,
    pub payment: Payment,
    pub items: Vec<Item>,
    pub locale: String,
    #[serde(default)]
    pub internal_signature: String,
    pub customer_id: String,
    pub delivery_service: String,
    pub shardkey: String,
    pub sm_id: i64,
    pub date_created: DateTime<Utc>,
    pub oof_shard: String,
}

/// Recipient and address of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub name: String,
    pub phone: String,
    pub zip: String,
    pub city: String,
    pub address: String,
    pub region: String,
    pub email: String,
}

/// Payment transaction attached to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub transaction: String,
    #[serde(default)]
    pub request_id: String,
    pub currency: String,
    pub provider: String,
    pub amount: i64,
    pub payment_dt: i64,
    pub bank: String,
    pub delivery_cost: i64,
    pub goods_total: i64,
    pub custom_fee: i64,
}

/// A single line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub chrt_id: i64,
    pub track_number: String,
    pub price: i64,
    pub rid: String,
    pub name: String,
    pub sale: i64,
    pub size: String,
    pub total_price: i64,
    pub nm_id: i64,
    pub brand: String,
    pub status: i32,
}

impl Order {
    /// Validates the order before it is stored.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.order_uid.is_empty() {
            return Some("order_uid cannot be empty".to_string());
        }
        if self.order_uid.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "order_uid exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        // Only UUID keys are reachable through the read surface
        if Uuid::parse_str(&self.order_uid).is_err() {
            return Some(format!("order_uid {:?} is not a valid UUID", self.order_uid));
        }
        if self.track_number.is_empty() {
            return Some("track_number cannot be empty".to_string());
        }
        if self.items.is_empty() {
            return Some("order must contain at least one item".to_string());
        }
        if let Some(pos) = self.items.iter().position(|i| i.track_number.is_empty()) {
            return Some(format!("item {} has an empty track_number", pos));
        }
        None
    }
}

impl Record for Order {
    fn key(&self) -> &str {
        &self.order_uid
    }
}
