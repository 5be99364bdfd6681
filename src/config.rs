//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;

const DEFAULT_CACHE_CAPACITY: usize = 1000;
const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_INGEST_WORKERS: usize = 2;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Maximum number of orders held in memory
    pub cache_capacity: usize,
    /// Number of recent orders loaded into the cache at startup
    pub warmup_count: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Number of concurrent ingestion workers
    pub ingest_workers: usize,
    /// Read JSON-encoded orders, one per line, from stdin
    pub ingest_stdin: bool,
    /// Optional JSON file of orders used to seed the store
    pub seed_file: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cached orders (default: 1000)
    /// - `WARMUP_COUNT` - Orders loaded at startup (default: the cache capacity)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `INGEST_WORKERS` - Ingestion worker count (default: 2)
    /// - `INGEST_STDIN` - `true`/`1` to ingest orders from stdin (default: false)
    /// - `SEED_FILE` - Path to a `{"orders": [...]}` JSON file (default: unset)
    pub fn from_env() -> Self {
        let cache_capacity = parse_var("CACHE_CAPACITY").unwrap_or(DEFAULT_CACHE_CAPACITY);

        Self {
            cache_capacity,
            warmup_count: parse_var("WARMUP_COUNT").unwrap_or(cache_capacity),
            server_port: parse_var("SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
            ingest_workers: parse_var("INGEST_WORKERS").unwrap_or(DEFAULT_INGEST_WORKERS),
            ingest_stdin: env::var("INGEST_STDIN")
                .ok()
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            seed_file: env::var("SEED_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            warmup_count: DEFAULT_CACHE_CAPACITY,
            server_port: DEFAULT_SERVER_PORT,
            ingest_workers: DEFAULT_INGEST_WORKERS,
            ingest_stdin: false,
            seed_file: None,
        }
    }
}
