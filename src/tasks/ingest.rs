//! Order Ingestion Tasks
//!
//! Decodes incoming orders and saves them through the cache.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::OrderCache;
use crate::error::{CacheError, Result};
use crate::models::Order;

/// Decodes and validates one JSON-encoded order.
pub fn decode_order(line: &str) -> Result<Order> {
    let order: Order = serde_json::from_str(line)
        .map_err(|e| CacheError::InvalidRequest(format!("malformed order: {}", e)))?;
    if let Some(msg) = order.validate() {
        return Err(CacheError::InvalidRequest(msg));
    }
    Ok(order)
}

/// Spawns a task forwarding valid orders read line by line from `reader`.
///
/// Blank lines are ignored; undecodable or invalid orders are logged and
/// skipped. The task ends at EOF, on a read error, or once every receiver
/// is gone.
pub fn spawn_line_reader<Rd>(reader: Rd, tx: mpsc::Sender<Order>) -> JoinHandle<()>
where
    Rd: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = reader.lines();
        let mut line_no = 0usize;

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    error!(error = %e, "failed to read ingestion input");
                    break;
                }
            };
            line_no += 1;
            if line.trim().is_empty() {
                continue;
            }

            match decode_order(&line) {
                Ok(order) => {
                    if tx.send(order).await.is_err() {
                        debug!("ingestion channel closed, stopping reader");
                        break;
                    }
                }
                Err(e) => warn!(line = line_no, error = %e, "skipping order"),
            }
        }

        info!("Ingestion input exhausted after {} lines", line_no);
    })
}

/// Spawns `workers` tasks that save every received order through `cache`.
///
/// Failed saves are logged and dropped; the cache does not retry. Workers
/// exit once the channel is closed and drained.
pub fn spawn_ingest_workers(
    cache: Arc<OrderCache>,
    rx: mpsc::Receiver<Order>,
    workers: usize,
) -> Vec<JoinHandle<()>> {
    let rx = Arc::new(Mutex::new(rx));

    (0..workers.max(1))
        .map(|worker| {
            let cache = Arc::clone(&cache);
            let rx = Arc::clone(&rx);

            tokio::spawn(async move {
                debug!(worker, "ingest worker started");
                loop {
                    // Hold the receiver only while waiting, not while saving
                    let next = { rx.lock().await.recv().await };
                    let Some(order) = next else {
                        break;
                    };

                    let uid = order.order_uid.clone();
                    match cache.save(order).await {
                        Ok(()) => debug!(worker, order_uid = %uid, "order saved"),
                        Err(e) => error!(worker, order_uid = %uid, error = %e, "failed to save order"),
                    }
                }
                debug!(worker, "ingest worker stopped");
            })
        })
        .collect()
}
