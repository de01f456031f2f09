//! Request batching engine
//!
//! Callers enqueue chat requests; the engine coalesces requests for the same
//! `(provider, model)` into one adapter batch call and falls back to
//! individual calls when the batch fails.

mod config;
mod engine;
mod metrics;
mod types;


pub use config::{BatchConfig, DEFAULT_BATCH_SIZE, DEFAULT_WINDOW};
pub use engine::BatchEngine;
pub use metrics::{BatchMetrics, MetricsSnapshot};
pub use types::{BatchTicket, QueueKey};
