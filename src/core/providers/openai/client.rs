//! OpenAI Client
//!
//! One-shot requests go to the chat-completions endpoint. Batches are sent
//! as `{"requests": [...]}` to the same endpoint with the `OpenAI-Beta`
//! header, and `choices[i]` answers request `i`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::config::{CHAT_COMPLETIONS_PATH, OpenAIConfig};
use crate::core::providers::base::{
    build_http_client, endpoint_url, map_send_error, read_body, require_api_key,
};
use crate::core::providers::unified_provider::ProviderError;
use crate::core::traits::{BatchAdapter, BatchItemRequest};
use crate::core::types::{ChatMessage, ChatOptions, ChatResponse, MessageRole, Usage};

const PROVIDER: &str = "openai";
const BETA_HEADER: &str = "OpenAI-Beta";
const BETA_VALUE: &str = "assistants=v1";

#[derive(Debug, Deserialize)]
struct CompletionBody {
    id: Option<String>,
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    role: Option<MessageRole>,
    content: Option<String>,
}

impl From<WireMessage> for ChatMessage {
    fn from(wire: WireMessage) -> Self {
        ChatMessage::new(
            wire.role.unwrap_or(MessageRole::Assistant),
            wire.content.unwrap_or_default(),
        )
    }
}

/// OpenAI adapter
#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    config: OpenAIConfig,
    http_client: Client,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Result<Self, ProviderError> {
        config.validate()?;
        let http_client = build_http_client(
            PROVIDER,
            config.request_timeout(),
            config.connect_timeout(),
        )?;
        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Wire payload for one request: `{model, messages, ...options}`
    pub fn build_request_body(&self, messages: &[ChatMessage], options: &ChatOptions) -> Value {
        let mut body = Map::new();
        body.insert(
            "model".to_string(),
            json!(options.resolve_model(&self.config.default_model)),
        );
        body.insert("messages".to_string(), json!(messages));
        body.extend(options.provider_params());
        Value::Object(body)
    }

    async fn post(&self, path: &str, body: &Value, beta: bool) -> Result<CompletionBody, ProviderError> {
        let api_key = require_api_key(PROVIDER, self.config.api_key.as_deref())?;
        let url = endpoint_url(&self.config.base_url, path);

        let mut request = self.http_client.post(&url).bearer_auth(api_key).json(body);
        if beta {
            request = request.header(BETA_HEADER, BETA_VALUE);
        }
        let response = request
            .send()
            .await
            .map_err(|e| map_send_error(PROVIDER, e))?;

        let text = read_body(PROVIDER, response).await?;
        serde_json::from_str(&text).map_err(|e| {
            ProviderError::response_parsing(PROVIDER, format!("Failed to parse JSON: {}", e))
        })
    }
}

#[async_trait]
impl BatchAdapter for OpenAIProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    async fn single_request(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse, ProviderError> {
        let body = self.build_request_body(messages, options);
        let completion = self.post(CHAT_COMPLETIONS_PATH, &body, false).await?;

        let model = completion
            .model
            .unwrap_or_else(|| options.resolve_model(&self.config.default_model).to_string());
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::response_parsing(PROVIDER, "Response has no choices"))?;

        Ok(ChatResponse {
            id: completion.id,
            model,
            message: choice.message.into(),
            finish_reason: choice.finish_reason,
            usage: completion.usage,
        })
    }

    async fn batch_request(
        &self,
        requests: &[BatchItemRequest],
    ) -> Result<Vec<ChatResponse>, ProviderError> {
        let items: Vec<Value> = requests
            .iter()
            .map(|r| self.build_request_body(&r.messages, &r.options))
            .collect();
        let body = json!({ "requests": items });
        debug!(provider = PROVIDER, size = requests.len(), "Sending batch request");

        let completion = self.post(&self.config.batch_path, &body, true).await?;

        let responses = completion
            .choices
            .into_iter()
            .enumerate()
            .map(|(index, choice)| {
                let model = completion.model.clone().unwrap_or_else(|| {
                    requests
                        .get(index)
                        .map(|r| r.options.resolve_model(&self.config.default_model))
                        .unwrap_or(&self.config.default_model)
                        .to_string()
                });
                ChatResponse {
                    id: completion.id.clone(),
                    model,
                    message: choice.message.into(),
                    finish_reason: choice.finish_reason,
                    usage: None,
                }
            })
            .collect();
        Ok(responses)
    }
}
