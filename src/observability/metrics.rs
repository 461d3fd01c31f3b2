//! Metrics collection.
//!
//! # Metrics
//! - `acdcn_db_operations_total` (counter): logical client operations
//! - `acdcn_db_errors_total` (counter): failed attempts, retried or not
//! - `acdcn_db_healthy` (gauge): 1=ready, 0=anything else
//! - `acdcn_db_batch_chunks_total` (counter): committed write chunks
//! - `acdcn_db_batch_chunk_size` (histogram): writes per committed chunk
//!
//! Updates go through the `metrics` facade and are no-ops until the host
//! process installs a recorder.

pub fn record_operation() {
    metrics::counter!("acdcn_db_operations_total").increment(1);
}

pub fn record_error() {
    metrics::counter!("acdcn_db_errors_total").increment(1);
}

pub fn record_client_health(healthy: bool) {
    metrics::gauge!("acdcn_db_healthy").set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_batch_chunk(writes: usize) {
    metrics::counter!("acdcn_db_batch_chunks_total").increment(1);
    metrics::histogram!("acdcn_db_batch_chunk_size").record(writes as f64);
}
