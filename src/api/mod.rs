//! API Module
//!
//! HTTP handlers and routing for the order read surface.
//!
//! # Endpoints
//! - `GET /order/:uid` - Fetch an order by UID
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
