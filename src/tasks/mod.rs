//! Background Tasks Module
//!
//! Contains the tasks that run alongside the HTTP server.
//!
//! # Tasks
//! - Line reader: decodes JSON orders from a byte stream into a channel
//! - Ingest workers: drain that channel into the cache via write-through saves

mod ingest;

pub use ingest::{decode_order, spawn_ingest_workers, spawn_line_reader};
