//! Per-request options forwarded to a provider

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options bag for one chat request.
///
/// `batch` (the `async` key on the wire) opts the request into the batching
/// engine. It is a routing hint and is never sent to a provider; every other
/// field, including anything in `extra`, is merged into the provider payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatOptions {
    /// Route through the batching engine instead of a one-shot call
    #[serde(rename = "async", default, skip_serializing_if = "std::ops::Not::not")]
    pub batch: bool,
    /// Model override; the adapter's default model is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    /// Provider-specific parameters passed through verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that opt into batching
    pub fn batched() -> Self {
        Self {
            batch: true,
            ..Self::default()
        }
    }

    pub fn with_batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Resolve the model for this request against an adapter default
    pub fn resolve_model<'a>(&'a self, default_model: &'a str) -> &'a str {
        self.model.as_deref().unwrap_or(default_model)
    }

    /// Provider-facing fields, without the routing flag or the model
    pub fn provider_params(&self) -> Map<String, Value> {
        let mut params = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        params.remove("async");
        params.remove("model");
        params
    }
}
