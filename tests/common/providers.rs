//! Provider test utilities
//!
//! An instrumented in-memory adapter plus helpers for live-provider tests.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use llm_batch::{
    BatchAdapter, BatchItemRequest, ChatMessage, ChatOptions, ChatResponse, ProviderError,
    assistant_message,
};
use parking_lot::Mutex;

/// How [`MockAdapter::batch_request`] behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    /// One echo per request
    Succeed,
    /// Whole call fails with a network error
    Fail,
    /// One result short of the request count
    DropLast,
    /// Adapter panics mid-call
    Panic,
}

/// One observed `batch_request` call
#[derive(Debug, Clone)]
pub struct RecordedBatch {
    pub models: Vec<String>,
    pub prompts: Vec<String>,
}

/// Adapter that echoes prompts and records every call it receives.
///
/// `single_request` fails for any prompt containing `"fail"` and panics for
/// any prompt containing `"boom"`.
#[derive(Debug)]
pub struct MockAdapter {
    name: &'static str,
    default_model: String,
    batch_delay: Duration,
    mode: Mutex<BatchMode>,
    batches: Mutex<Vec<RecordedBatch>>,
    single_calls: Mutex<Vec<String>>,
    in_flight: Mutex<HashMap<String, usize>>,
    max_in_flight_per_key: AtomicUsize,
    max_in_flight_total: AtomicUsize,
}

impl MockAdapter {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            default_model: format!("{}-default", name),
            batch_delay: Duration::ZERO,
            mode: Mutex::new(BatchMode::Succeed),
            batches: Mutex::new(Vec::new()),
            single_calls: Mutex::new(Vec::new()),
            in_flight: Mutex::new(HashMap::new()),
            max_in_flight_per_key: AtomicUsize::new(0),
            max_in_flight_total: AtomicUsize::new(0),
        }
    }

    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    pub fn with_mode(self, mode: BatchMode) -> Self {
        *self.mode.lock() = mode;
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn set_mode(&self, mode: BatchMode) {
        *self.mode.lock() = mode;
    }

    /// Sizes of every batch call, in call order
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().iter().map(|b| b.prompts.len()).collect()
    }

    pub fn batches(&self) -> Vec<RecordedBatch> {
        self.batches.lock().clone()
    }

    pub fn single_calls(&self) -> Vec<String> {
        self.single_calls.lock().clone()
    }

    /// Most batch calls ever in flight at once for one model
    pub fn max_in_flight_per_key(&self) -> usize {
        self.max_in_flight_per_key.load(Ordering::SeqCst)
    }

    /// Most batch calls ever in flight at once across all models
    pub fn max_in_flight_total(&self) -> usize {
        self.max_in_flight_total.load(Ordering::SeqCst)
    }

    pub fn reply_to(prompt: &str) -> String {
        format!("echo: {}", prompt)
    }

    fn prompt_of(messages: &[ChatMessage]) -> String {
        messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }

    fn respond(&self, model: &str, messages: &[ChatMessage]) -> ChatResponse {
        ChatResponse {
            id: None,
            model: model.to_string(),
            message: assistant_message(Self::reply_to(&Self::prompt_of(messages))),
            finish_reason: Some("stop".to_string()),
            usage: None,
        }
    }

    fn enter(&self, model: &str) {
        let mut in_flight = self.in_flight.lock();
        let count = in_flight.entry(model.to_string()).or_insert(0);
        *count += 1;
        self.max_in_flight_per_key.fetch_max(*count, Ordering::SeqCst);
        let total: usize = in_flight.values().sum();
        self.max_in_flight_total.fetch_max(total, Ordering::SeqCst);
    }

    fn exit(&self, model: &str) {
        if let Some(count) = self.in_flight.lock().get_mut(model) {
            *count -= 1;
        }
    }
}

#[async_trait]
impl BatchAdapter for MockAdapter {
    fn name(&self) -> &'static str {
        self.name
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn single_request(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse, ProviderError> {
        let prompt = Self::prompt_of(messages);
        self.single_calls.lock().push(prompt.clone());
        if prompt.contains("boom") {
            panic!("mock adapter panicked on '{}'", prompt);
        }
        if prompt.contains("fail") {
            return Err(ProviderError::api_error(self.name, 500, format!("cannot answer '{}'", prompt)));
        }
        Ok(self.respond(options.resolve_model(&self.default_model), messages))
    }

    async fn batch_request(
        &self,
        requests: &[BatchItemRequest],
    ) -> Result<Vec<ChatResponse>, ProviderError> {
        let mode = *self.mode.lock();
        if mode == BatchMode::Panic {
            panic!("mock adapter panicked");
        }

        let models: Vec<String> = requests
            .iter()
            .map(|r| r.options.resolve_model(&self.default_model).to_string())
            .collect();
        self.batches.lock().push(RecordedBatch {
            models: models.clone(),
            prompts: requests.iter().map(|r| Self::prompt_of(&r.messages)).collect(),
        });

        let key_model = models.first().cloned().unwrap_or_default();
        self.enter(&key_model);
        if !self.batch_delay.is_zero() {
            tokio::time::sleep(self.batch_delay).await;
        }
        self.exit(&key_model);

        match mode {
            BatchMode::Fail => Err(ProviderError::network(self.name, "batch endpoint unavailable")),
            _ => {
                let mut responses: Vec<ChatResponse> = requests
                    .iter()
                    .zip(&models)
                    .map(|(r, model)| self.respond(model, &r.messages))
                    .collect();
                if mode == BatchMode::DropLast {
                    responses.pop();
                }
                Ok(responses)
            }
        }
    }
}

/// Get API key for a provider from environment
pub fn get_api_key(provider: &str) -> Option<String> {
    let key_var = match provider.to_lowercase().as_str() {
        "openai" => "OPENAI_API_KEY",
        "anthropic" | "claude" => "ANTHROPIC_API_KEY",
        _ => return None,
    };
    env::var(key_var).ok()
}
