//! Order Cache - A read-through, write-through LRU cache for orders
//!
//! Serves point lookups by order UID from a bounded in-memory cache backed
//! by a durable store, with ingestion workers feeding writes through it.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::{AppState, OrderCache};
pub use config::Config;
pub use tasks::{spawn_ingest_workers, spawn_line_reader};
