//! Counters for the batching engine

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Engine-wide counters, updated with relaxed atomics
#[derive(Debug, Default)]
pub struct BatchMetrics {
    /// Requests admitted by `enqueue`
    pub requests_enqueued: AtomicU64,
    /// Batch calls sent to an adapter
    pub batches_dispatched: AtomicU64,
    /// Requests carried by those batch calls
    pub batched_requests: AtomicU64,
    /// Batch calls that failed or returned a mismatched result list
    pub batch_failures: AtomicU64,
    /// One-shot calls issued by the fallback path
    pub fallback_requests: AtomicU64,
    /// Fallback calls that failed and were delivered as error payloads
    pub fallback_failures: AtomicU64,
    /// Results handed to a waiting caller
    pub results_delivered: AtomicU64,
    /// Results whose caller had already dropped its ticket
    pub results_abandoned: AtomicU64,
}

impl BatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_enqueued(&self) {
        self.requests_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch(&self, size: usize) {
        self.batches_dispatched.fetch_add(1, Ordering::Relaxed);
        self.batched_requests
            .fetch_add(size as u64, Ordering::Relaxed);
    }

    pub fn record_batch_failure(&self) {
        self.batch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self, failed: bool) {
        self.fallback_requests.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.fallback_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_delivery(&self, delivered: bool) {
        if delivered {
            self.results_delivered.fetch_add(1, Ordering::Relaxed);
        } else {
            self.results_abandoned.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_enqueued: self.requests_enqueued.load(Ordering::Relaxed),
            batches_dispatched: self.batches_dispatched.load(Ordering::Relaxed),
            batched_requests: self.batched_requests.load(Ordering::Relaxed),
            batch_failures: self.batch_failures.load(Ordering::Relaxed),
            fallback_requests: self.fallback_requests.load(Ordering::Relaxed),
            fallback_failures: self.fallback_failures.load(Ordering::Relaxed),
            results_delivered: self.results_delivered.load(Ordering::Relaxed),
            results_abandoned: self.results_abandoned.load(Ordering::Relaxed),
        }
    }
}

/// Serializable view of [`BatchMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub requests_enqueued: u64,
    pub batches_dispatched: u64,
    pub batched_requests: u64,
    pub batch_failures: u64,
    pub fallback_requests: u64,
    pub fallback_failures: u64,
    pub results_delivered: u64,
    pub results_abandoned: u64,
}

impl MetricsSnapshot {
    /// Mean number of requests per batch call
    pub fn avg_batch_size(&self) -> f64 {
        if self.batches_dispatched == 0 {
            return 0.0;
        }
        self.batched_requests as f64 / self.batches_dispatched as f64
    }
}
