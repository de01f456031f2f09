//! Backend adapter contract
//!
//! The batching engine only ever talks to a backend through this trait. An
//! adapter knows how to turn messages into a provider payload and a provider
//! response back into a [`ChatResponse`]; it never sees queue state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::{ChatMessage, ChatOptions, ChatResponse};

/// One entry of a batch call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItemRequest {
    pub messages: Vec<ChatMessage>,
    pub options: ChatOptions,
}

impl BatchItemRequest {
    pub fn new(messages: Vec<ChatMessage>, options: ChatOptions) -> Self {
        Self { messages, options }
    }
}

/// A named chat-completion backend
#[async_trait]
pub trait BatchAdapter: Send + Sync + 'static {
    /// Backend name used for registry lookup and queue keys
    fn name(&self) -> &'static str;

    /// Model used when a request does not name one
    fn default_model(&self) -> &str;

    /// One-shot completion
    async fn single_request(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse, ProviderError>;

    /// Completion for many requests in one network operation.
    ///
    /// Implementations must return exactly one response per request, in
    /// request order, or an error for the whole call.
    async fn batch_request(
        &self,
        requests: &[BatchItemRequest],
    ) -> Result<Vec<ChatResponse>, ProviderError>;
}
