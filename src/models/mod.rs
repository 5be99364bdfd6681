//! Data models for the order cache
//!
//! The order record itself plus the DTOs serialized by the HTTP surface.

pub mod order;
pub mod responses;

// Re-export commonly used types
pub use order::{Delivery, Item, Order, Payment};
pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
