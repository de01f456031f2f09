//! Per-key request queue, flush policy and fallback path
//!
//! Every `(provider, model)` pair gets its own FIFO queue and a `flushing`
//! flag. A flush takes a snapshot of the queue, sends it to the adapter as
//! one batch call and resolves each caller positionally. If the batch call
//! fails, every request in the snapshot is retried on its own, concurrently,
//! and each failure is delivered only to the caller it belongs to.
//!
//! ```text
//!   enqueue ──► KeyQueue.pending ──(len >= batch_size | window elapsed)──► flush
//!                    ▲                                                      │
//!                    └──────────── re-check after every flush ◄─────────────┘
//! ```
//!
//! Per key the engine is either idle or flushing; at most one batch call per
//! key is ever in flight.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::FutureExt;
use futures::future::join_all;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::config::BatchConfig;
use super::metrics::{BatchMetrics, MetricsSnapshot};
use super::types::{BatchTicket, PendingRequest, QueueKey, ResultSink};
use crate::core::providers::unified_provider::ProviderError;
use crate::core::traits::{BatchAdapter, BatchItemRequest};
use crate::core::types::{ChatMessage, ChatOptions, ChatResult, ItemError};
use crate::utils::error::Result;

/// Error delivered to a request enqueued with no Tokio runtime to flush it
const NO_RUNTIME_MESSAGE: &str = "no Tokio runtime available to flush the request";

/// Error delivered to a request whose own fallback call panicked
const FALLBACK_PANIC_MESSAGE: &str = "provider call panicked while handling the request";

/// Mutable state of one key, guarded by its own mutex
struct KeyQueue {
    adapter: Arc<dyn BatchAdapter>,
    pending: VecDeque<PendingRequest>,
    flushing: bool,
    timer_armed: bool,
    /// Bumped on every snapshot so stale window timers can tell they lost
    timer_epoch: u64,
}

/// What `enqueue` has to do once the key's lock is released
enum Trigger {
    Wait,
    Flush(Vec<PendingRequest>),
    ArmTimer(u64),
}

impl KeyQueue {
    fn new(adapter: Arc<dyn BatchAdapter>) -> Self {
        Self {
            adapter,
            pending: VecDeque::new(),
            flushing: false,
            timer_armed: false,
            timer_epoch: 0,
        }
    }

    /// Decide what a freshly appended request should set in motion
    fn evaluate(&mut self, config: &BatchConfig) -> Trigger {
        if self.flushing {
            // the in-flight flush re-checks the queue when it completes
            return Trigger::Wait;
        }
        if self.pending.len() >= config.batch_size || config.window.is_zero() {
            return match self.begin_flush(config.batch_size) {
                Some(snapshot) => Trigger::Flush(snapshot),
                None => Trigger::Wait,
            };
        }
        if self.timer_armed {
            return Trigger::Wait;
        }
        self.timer_armed = true;
        Trigger::ArmTimer(self.timer_epoch)
    }

    /// Take up to `max` of the oldest requests and mark the key as flushing.
    /// Returns `None` and leaves the key idle when nothing is queued.
    fn begin_flush(&mut self, max: usize) -> Option<Vec<PendingRequest>> {
        if self.pending.is_empty() {
            return None;
        }
        let take = self.pending.len().min(max);
        let snapshot: Vec<PendingRequest> = self.pending.drain(..take).collect();
        self.flushing = true;
        self.timer_armed = false;
        self.timer_epoch = self.timer_epoch.wrapping_add(1);
        Some(snapshot)
    }
}

struct EngineInner {
    config: BatchConfig,
    queues: DashMap<QueueKey, Arc<Mutex<KeyQueue>>>,
    metrics: BatchMetrics,
}

/// Coalesces requests per `(provider, model)` into batch calls.
///
/// Cheap to clone; clones share the same queues. Each engine owns its own
/// state, so separately configured engines never interfere.
#[derive(Clone)]
pub struct BatchEngine {
    inner: Arc<EngineInner>,
}

impl BatchEngine {
    /// Create an engine, rejecting invalid configuration
    pub fn new(config: BatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(EngineInner {
                config,
                queues: DashMap::new(),
                metrics: BatchMetrics::new(),
            }),
        })
    }

    /// Queue key for a request: the adapter name plus the explicit model or
    /// the adapter's default
    pub fn key_for(adapter: &dyn BatchAdapter, options: &ChatOptions) -> QueueKey {
        QueueKey::new(adapter.name(), options.resolve_model(adapter.default_model()))
    }

    /// Admit a request and return the ticket its result will arrive on.
    ///
    /// Never fails synchronously. Flushes and window timers run as tasks on
    /// the caller's Tokio runtime; called outside one, the ticket resolves
    /// with an error and the request is never queued.
    pub fn enqueue(
        &self,
        adapter: &Arc<dyn BatchAdapter>,
        messages: Vec<ChatMessage>,
        options: ChatOptions,
    ) -> BatchTicket {
        let key = Self::key_for(adapter.as_ref(), &options);
        let (pending, ticket) = PendingRequest::new(BatchItemRequest::new(messages, options));
        self.inner.metrics.record_enqueued();

        let Ok(runtime) = Handle::try_current() else {
            warn!(key = %key, "Request enqueued outside a Tokio runtime");
            let (_, sink) = pending.into_parts();
            self.inner.deliver(sink, Err(ItemError::new(NO_RUNTIME_MESSAGE)));
            return ticket;
        };
        let queue = self.inner.queue(&key, adapter);

        let (trigger, depth) = {
            let mut state = queue.lock();
            state.pending.push_back(pending);
            let depth = state.pending.len();
            (state.evaluate(&self.inner.config), depth)
        };
        debug!(key = %key, queue_depth = depth, "Request enqueued");

        match trigger {
            Trigger::Flush(snapshot) => {
                runtime.spawn(Arc::clone(&self.inner).run_flush(key, queue, snapshot));
            }
            Trigger::ArmTimer(epoch) => {
                Arc::clone(&self.inner).spawn_window_timer(&runtime, key, queue, epoch);
            }
            Trigger::Wait => {}
        }

        ticket
    }

    /// Requests waiting for a flush on `key`
    pub fn queue_depth(&self, key: &QueueKey) -> usize {
        self.inner
            .queues
            .get(key)
            .map(|queue| queue.lock().pending.len())
            .unwrap_or(0)
    }

    /// Whether a batch call for `key` is currently in flight
    pub fn is_flushing(&self, key: &QueueKey) -> bool {
        self.inner
            .queues
            .get(key)
            .map(|queue| queue.lock().flushing)
            .unwrap_or(false)
    }

    /// Every key that has received at least one request
    pub fn keys(&self) -> Vec<QueueKey> {
        let mut keys: Vec<QueueKey> = self.inner.queues.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    pub fn config(&self) -> &BatchConfig {
        &self.inner.config
    }
}

impl std::fmt::Debug for BatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchEngine")
            .field("config", &self.inner.config)
            .field("keys", &self.inner.queues.len())
            .finish()
    }
}

impl EngineInner {
    fn queue(&self, key: &QueueKey, adapter: &Arc<dyn BatchAdapter>) -> Arc<Mutex<KeyQueue>> {
        if let Some(queue) = self.queues.get(key) {
            return Arc::clone(queue.value());
        }
        let entry = self
            .queues
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(KeyQueue::new(Arc::clone(adapter)))));
        Arc::clone(&*entry)
    }

    fn spawn_window_timer(
        self: Arc<Self>,
        runtime: &Handle,
        key: QueueKey,
        queue: Arc<Mutex<KeyQueue>>,
        epoch: u64,
    ) {
        let window: Duration = self.config.window;
        runtime.spawn(async move {
            tokio::time::sleep(window).await;
            let snapshot = {
                let mut state = queue.lock();
                if state.timer_epoch != epoch || state.flushing {
                    None
                } else {
                    state.timer_armed = false;
                    state.begin_flush(self.config.batch_size)
                }
            };
            if let Some(snapshot) = snapshot {
                debug!(key = %key, size = snapshot.len(), "Batch window elapsed");
                self.run_flush(key, queue, snapshot).await;
            }
        });
    }

    /// Drive one key from its first snapshot until a re-check finds the
    /// queue empty. The key's `flushing` flag is set for the whole run.
    async fn run_flush(
        self: Arc<Self>,
        key: QueueKey,
        queue: Arc<Mutex<KeyQueue>>,
        mut snapshot: Vec<PendingRequest>,
    ) {
        let adapter = Arc::clone(&queue.lock().adapter);
        loop {
            let dispatched = AssertUnwindSafe(self.dispatch(&key, adapter.as_ref(), snapshot))
                .catch_unwind()
                .await;
            if dispatched.is_err() {
                error!(key = %key, "Adapter panicked during flush; affected requests resolved as dropped");
            }

            let next = {
                let mut state = queue.lock();
                state.flushing = false;
                state.begin_flush(self.config.batch_size)
            };
            match next {
                Some(residual) => {
                    debug!(key = %key, size = residual.len(), "Flushing requests queued during previous batch");
                    snapshot = residual;
                }
                None => break,
            }
        }
    }

    async fn dispatch(
        &self,
        key: &QueueKey,
        adapter: &dyn BatchAdapter,
        snapshot: Vec<PendingRequest>,
    ) {
        let flush_id = Uuid::new_v4();
        let oldest_wait = snapshot
            .first()
            .map(|p| p.enqueued_at.elapsed())
            .unwrap_or_default();
        let (requests, sinks): (Vec<BatchItemRequest>, Vec<ResultSink>) =
            snapshot.into_iter().map(PendingRequest::into_parts).unzip();

        self.metrics.record_batch(requests.len());
        debug!(
            key = %key,
            flush_id = %flush_id,
            size = requests.len(),
            oldest_wait_ms = oldest_wait.as_millis() as u64,
            "Dispatching batch"
        );

        let outcome = match adapter.batch_request(&requests).await {
            Ok(responses) if responses.len() == requests.len() => Ok(responses),
            Ok(responses) => Err(ProviderError::batch_size_mismatch(
                adapter.name(),
                requests.len(),
                responses.len(),
            )),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(responses) => {
                for (sink, response) in sinks.into_iter().zip(responses) {
                    self.deliver(sink, Ok(response));
                }
            }
            Err(err) => {
                self.metrics.record_batch_failure();
                warn!(
                    key = %key,
                    flush_id = %flush_id,
                    size = requests.len(),
                    error = %err,
                    "Batch request failed, falling back to individual requests"
                );
                self.fallback(key, adapter, &requests, sinks).await;
            }
        }
    }

    /// Issue one request per item, concurrently; each outcome goes only to
    /// its own caller
    async fn fallback(
        &self,
        key: &QueueKey,
        adapter: &dyn BatchAdapter,
        requests: &[BatchItemRequest],
        sinks: Vec<ResultSink>,
    ) {
        let calls = requests
            .iter()
            .zip(sinks)
            .enumerate()
            .map(|(index, (request, sink))| async move {
                let call = adapter.single_request(&request.messages, &request.options);
                let result = match AssertUnwindSafe(call).catch_unwind().await {
                    Ok(result) => result.map_err(ItemError::from),
                    Err(_) => {
                        error!(key = %key, index, "Adapter panicked during fallback request");
                        Err(ItemError::new(FALLBACK_PANIC_MESSAGE))
                    }
                };
                if let Err(err) = &result {
                    warn!(key = %key, index, error = %err.error, "Fallback request failed");
                }
                self.metrics.record_fallback(result.is_err());
                self.deliver(sink, result);
            });
        join_all(calls).await;
    }

    fn deliver(&self, sink: ResultSink, result: ChatResult) {
        let delivered = sink.resolve(result);
        if !delivered {
            debug!("Caller dropped its ticket before the result arrived");
        }
        self.metrics.record_delivery(delivered);
    }
}
