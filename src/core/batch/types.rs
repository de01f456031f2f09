//! Queue keys, pending requests and the caller-facing ticket

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use tokio::sync::oneshot;

use crate::core::traits::BatchItemRequest;
use crate::core::types::{ChatResult, ItemError};

/// Identifies one logical queue: a backend plus the resolved model
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueueKey {
    pub provider: String,
    pub model: String,
}

impl QueueKey {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }
}

impl fmt::Display for QueueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.provider, self.model)
    }
}

/// Delivery end of one request's result channel
#[derive(Debug)]
pub(crate) struct ResultSink(oneshot::Sender<ChatResult>);

impl ResultSink {
    /// Hand the result to the caller. Returns false if the ticket was dropped.
    pub(crate) fn resolve(self, result: ChatResult) -> bool {
        self.0.send(result).is_ok()
    }
}

/// One caller's request waiting in a key's queue
pub(crate) struct PendingRequest {
    pub(crate) request: BatchItemRequest,
    pub(crate) enqueued_at: Instant,
    sink: ResultSink,
}

impl PendingRequest {
    pub(crate) fn new(request: BatchItemRequest) -> (Self, BatchTicket) {
        let (tx, rx) = oneshot::channel();
        let pending = Self {
            request,
            enqueued_at: Instant::now(),
            sink: ResultSink(tx),
        };
        (pending, BatchTicket { rx })
    }

    pub(crate) fn into_parts(self) -> (BatchItemRequest, ResultSink) {
        (self.request, self.sink)
    }
}

impl fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("messages", &self.request.messages.len())
            .field("enqueued_at", &self.enqueued_at)
            .finish()
    }
}

/// Future returned by [`BatchEngine::enqueue`](super::BatchEngine::enqueue).
///
/// Always resolves: to the provider response, or to an [`ItemError`] when
/// the batch and the per-item fallback both failed for this request.
#[derive(Debug)]
#[must_use = "a ticket does nothing unless awaited"]
pub struct BatchTicket {
    rx: oneshot::Receiver<ChatResult>,
}

impl Future for BatchTicket {
    type Output = ChatResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(ItemError::new(
                    "request dropped before a result was delivered",
                ))
            })
        })
    }
}
