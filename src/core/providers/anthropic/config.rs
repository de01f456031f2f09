//! Anthropic Configuration

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::providers::unified_provider::ProviderError;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-2";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Anthropic provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    /// API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL
    pub base_url: String,
    /// Value of the `anthropic-version` header
    pub api_version: String,
    pub default_model: String,
    /// `max_tokens` sent when a request does not set one
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub request_timeout: u64,
    /// Connect timeout in seconds
    pub connect_timeout: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout: 120,
            connect_timeout: 10,
        }
    }
}

impl AnthropicConfig {
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

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay `ANTHROPIC_*` environment variables. `CLAUDE_API_KEY` is
    /// accepted as a fallback for the key.
    pub fn apply_env(&mut self) {
        if let Ok(api_key) = env::var("ANTHROPIC_API_KEY").or_else(|_| env::var("CLAUDE_API_KEY")) {
            self.api_key = Some(api_key);
        }
        if let Ok(base_url) = env::var("ANTHROPIC_BASE_URL") {
            self.base_url = base_url;
        }
        if let Ok(api_version) = env::var("ANTHROPIC_API_VERSION") {
            self.api_version = api_version;
        }
        if let Ok(model) = env::var("ANTHROPIC_DEFAULT_MODEL") {
            self.default_model = model;
        }
        if let Some(timeout) = env::var("ANTHROPIC_TIMEOUT").ok().and_then(|t| t.parse().ok()) {
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
                "anthropic",
                format!("base_url must be an http(s) URL, got '{}'", self.base_url),
            ));
        }
        if self.max_tokens == 0 {
            return Err(ProviderError::configuration(
                "anthropic",
                "max_tokens must be greater than 0",
            ));
        }
        if self.request_timeout == 0 {
            return Err(ProviderError::configuration(
                "anthropic",
                "request_timeout must be greater than 0",
            ));
        }
        Ok(())
    }
}
