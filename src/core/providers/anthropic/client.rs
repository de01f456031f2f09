//! Anthropic Client
//!
//! Single requests use the messages endpoint. Batches go to
//! `/v1/messages/batch` as JSON Lines, one message body per line, and the
//! response carries one message per line in request order.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::config::AnthropicConfig;
use crate::core::providers::base::{
    build_http_client, endpoint_url, map_send_error, read_body, require_api_key,
};
use crate::core::providers::unified_provider::ProviderError;
use crate::core::traits::{BatchAdapter, BatchItemRequest};
use crate::core::types::{
    ChatMessage, ChatOptions, ChatResponse, MessageRole, Usage, assistant_message,
};

const PROVIDER: &str = "anthropic";
const MESSAGES_PATH: &str = "/v1/messages";
const BATCH_PATH: &str = "/v1/messages/batch";
const JSONL_CONTENT_TYPE: &str = "application/x-jsonlines";

#[derive(Debug, Deserialize)]
struct MessageBody {
    id: Option<String>,
    model: Option<String>,
    #[serde(default)]
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: Option<WireUsage>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl From<WireUsage> for Usage {
    fn from(usage: WireUsage) -> Self {
        Usage {
            prompt_tokens: usage.input_tokens,
            completion_tokens: usage.output_tokens,
            total_tokens: usage.input_tokens.saturating_add(usage.output_tokens),
        }
    }
}

/// Anthropic adapter
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    config: AnthropicConfig,
    http_client: Client,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicConfig) -> Result<Self, ProviderError> {
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

    pub fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    /// Wire payload for one request.
    ///
    /// System messages are lifted into the top-level `system` field and
    /// `stop` is renamed to `stop_sequences`.
    pub fn build_request_body(&self, messages: &[ChatMessage], options: &ChatOptions) -> Value {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect();
        let turns: Vec<Value> = messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| {
                let role = match m.role {
                    MessageRole::Assistant => "assistant",
                    _ => "user",
                };
                json!({ "role": role, "content": m.content })
            })
            .collect();

        let mut body = Map::new();
        body.insert(
            "model".to_string(),
            json!(options.resolve_model(&self.config.default_model)),
        );
        body.insert(
            "max_tokens".to_string(),
            json!(options.max_tokens.unwrap_or(self.config.max_tokens)),
        );
        if !system.is_empty() {
            body.insert("system".to_string(), json!(system.join("\n\n")));
        }
        body.insert("messages".to_string(), Value::Array(turns));

        let mut params = options.provider_params();
        params.remove("max_tokens");
        if let Some(stop) = params.remove("stop") {
            params.insert("stop_sequences".to_string(), stop);
        }
        body.extend(params);
        Value::Object(body)
    }

    fn build_headers(&self, api_key: &str) -> Result<HeaderMap, ProviderError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| ProviderError::authentication(PROVIDER, "API key is not a valid header value"))?;
        headers.insert("x-api-key", key);
        let version = HeaderValue::from_str(&self.config.api_version).map_err(|_| {
            ProviderError::configuration(PROVIDER, "api_version is not a valid header value")
        })?;
        headers.insert("anthropic-version", version);
        Ok(headers)
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, ProviderError> {
        let response = request
            .send()
            .await
            .map_err(|e| map_send_error(PROVIDER, e))?;
        read_body(PROVIDER, response).await
    }

    fn transform_response(&self, body: MessageBody, fallback_model: &str) -> Result<ChatResponse, ProviderError> {
        if let Some(error) = body.error {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(ProviderError::api_error(PROVIDER, 500, message));
        }

        let text: String = body
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();

        Ok(ChatResponse {
            id: body.id,
            model: body.model.unwrap_or_else(|| fallback_model.to_string()),
            message: assistant_message(text),
            finish_reason: body.stop_reason,
            usage: body.usage.map(Usage::from),
        })
    }
}

fn parse_message(text: &str) -> Result<MessageBody, ProviderError> {
    serde_json::from_str(text).map_err(|e| {
        ProviderError::response_parsing(PROVIDER, format!("Failed to parse JSON: {}", e))
    })
}

#[async_trait]
impl BatchAdapter for AnthropicProvider {
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
        let api_key = require_api_key(PROVIDER, self.config.api_key.as_deref())?;
        let body = self.build_request_body(messages, options);
        let request = self
            .http_client
            .post(endpoint_url(&self.config.base_url, MESSAGES_PATH))
            .headers(self.build_headers(api_key)?)
            .json(&body);

        let text = self.send(request).await?;
        self.transform_response(
            parse_message(&text)?,
            options.resolve_model(&self.config.default_model),
        )
    }

    async fn batch_request(
        &self,
        requests: &[BatchItemRequest],
    ) -> Result<Vec<ChatResponse>, ProviderError> {
        let api_key = require_api_key(PROVIDER, self.config.api_key.as_deref())?;
        let lines = requests
            .iter()
            .map(|r| serde_json::to_string(&self.build_request_body(&r.messages, &r.options)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ProviderError::serialization(PROVIDER, e.to_string()))?;
        debug!(provider = PROVIDER, size = requests.len(), "Sending batch request");

        let request = self
            .http_client
            .post(endpoint_url(&self.config.base_url, BATCH_PATH))
            .headers(self.build_headers(api_key)?)
            .header(CONTENT_TYPE, JSONL_CONTENT_TYPE)
            .body(lines.join("\n"));

        let text = self.send(request).await?;
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(index, line)| {
                let fallback_model = requests
                    .get(index)
                    .map(|r| r.options.resolve_model(&self.config.default_model))
                    .unwrap_or(&self.config.default_model);
                self.transform_response(parse_message(line)?, fallback_model)
            })
            .collect()
    }
}
