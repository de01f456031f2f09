//! Client facade
//!
//! [`LlmBatch`] owns a provider registry and one batching engine. Requests
//! with `batch` unset go straight to the adapter; batched requests are
//! queued and resolve when their key flushes.

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::config::Config;
use crate::core::batch::{BatchConfig, BatchEngine, BatchTicket, MetricsSnapshot};
use crate::core::providers::{AnthropicProvider, OpenAIProvider, ProviderRegistry};
use crate::core::traits::BatchAdapter;
use crate::core::types::{ChatMessage, ChatOptions, ChatResponse};
use crate::utils::error::{LlmBatchError, Result};

/// Chat client with transparent request batching
#[derive(Debug, Clone)]
pub struct LlmBatch {
    providers: ProviderRegistry,
    engine: BatchEngine,
}

impl LlmBatch {
    /// Client with the OpenAI and Anthropic adapters built from `config`
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let openai = OpenAIProvider::new(config.providers.openai.clone())?;
        let anthropic = AnthropicProvider::new(config.providers.anthropic.clone())?;

        let client = Self::builder()
            .batch_config(config.batch.to_batch_config())
            .adapter(Arc::new(openai))
            .adapter(Arc::new(anthropic))
            .build()?;
        info!(
            providers = ?client.providers.list(),
            batch_size = client.engine.config().batch_size,
            window_ms = client.engine.config().window.as_millis() as u64,
            "Batching client initialized"
        );
        Ok(client)
    }

    /// Builder for custom adapters or engine settings
    pub fn builder() -> LlmBatchBuilder {
        LlmBatchBuilder::default()
    }

    /// Send a chat request.
    ///
    /// Unknown providers fail immediately. With `options.batch` unset the
    /// request is sent on its own and never touches the engine; otherwise it
    /// is queued and this resolves when its batch (or fallback) completes.
    pub async fn chat(
        &self,
        provider: &str,
        messages: Vec<ChatMessage>,
        options: ChatOptions,
    ) -> Result<ChatResponse> {
        let adapter = self.providers.get(provider)?;
        if !options.batch {
            debug!(provider, "Sending one-shot request");
            return Ok(adapter.single_request(&messages, &options).await?);
        }
        Ok(self.engine.enqueue(&adapter, messages, options).await?)
    }

    /// Queue a request without waiting for it.
    ///
    /// Fails synchronously only for an unknown provider or when called
    /// outside a Tokio runtime. The `batch` flag is ignored; submitted
    /// requests are always batched.
    pub fn submit(
        &self,
        provider: &str,
        messages: Vec<ChatMessage>,
        options: ChatOptions,
    ) -> Result<BatchTicket> {
        let adapter = self.providers.get(provider)?;
        if Handle::try_current().is_err() {
            return Err(LlmBatchError::config(
                "submit must be called from inside a Tokio runtime",
            ));
        }
        Ok(self.engine.enqueue(&adapter, messages, options))
    }

    pub fn engine(&self) -> &BatchEngine {
        &self.engine
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.engine.metrics()
    }
}

/// Builder for [`LlmBatch`]
#[derive(Debug, Default)]
pub struct LlmBatchBuilder {
    providers: ProviderRegistry,
    batch_config: BatchConfig,
}

impl LlmBatchBuilder {
    /// Register an adapter, replacing any adapter with the same name
    pub fn adapter(mut self, adapter: Arc<dyn BatchAdapter>) -> Self {
        self.providers.register(adapter);
        self
    }

    pub fn batch_config(mut self, config: BatchConfig) -> Self {
        self.batch_config = config;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_config.batch_size = batch_size;
        self
    }

    pub fn window(mut self, window: std::time::Duration) -> Self {
        self.batch_config.window = window;
        self
    }

    pub fn build(self) -> Result<LlmBatch> {
        if self.providers.is_empty() {
            return Err(LlmBatchError::config("at least one provider must be registered"));
        }
        Ok(LlmBatch {
            providers: self.providers,
            engine: BatchEngine::new(self.batch_config)?,
        })
    }
}
