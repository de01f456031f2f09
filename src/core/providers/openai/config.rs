//! OpenAI Provider Configuration

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::providers::unified_provider::ProviderError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// OpenAI provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAIConfig {
    /// API key; requests fail with an authentication error without one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    /// Model used when a request does not name one
    pub default_model: String,
    /// Endpoint that accepts `{"requests": [...]}` bodies
    pub batch_path: String,
    /// Request timeout in seconds
    pub request_timeout: u64,
    /// Connect timeout in seconds
    pub connect_timeout: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            batch_path: CHAT_COMPLETIONS_PATH.to_string(),
            request_timeout: 60,
            connect_timeout: 10,
        }
    }
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Defaults overlaid with `OPENAI_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay any `OPENAI_*` environment variables that are set
    pub fn apply_env(&mut self) {
        if let Ok(api_key) = env::var("OPENAI_API_KEY") {
            self.api_key = Some(api_key);
        }
        if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
            self.base_url = base_url;
        }
        if let Ok(model) = env::var("OPENAI_DEFAULT_MODEL") {
            self.default_model = model;
        }
        if let Some(timeout) = env::var("OPENAI_TIMEOUT").ok().and_then(|t| t.parse().ok()) {
            self.request_timeout = timeout;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ProviderError::configuration(
                "openai",
                format!("base_url must be an http(s) URL, got '{}'", self.base_url),
            ));
        }
        if self.request_timeout == 0 {
            return Err(ProviderError::configuration(
                "openai",
                "request_timeout must be greater than 0",
            ));
        }
        Ok(())
    }
}
