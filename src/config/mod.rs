//! Configuration management
//!
//! Configuration comes from a YAML file, the environment, or both (the
//! environment wins). Every section is optional and falls back to defaults.
//!
//! ```yaml
//! batch:
//!   batch_size: 50
//!   window_ms: 100
//! providers:
//!   openai:
//!     default_model: gpt-3.5-turbo
//!   anthropic:
//!     default_model: claude-2
//! logging:
//!   level: info
//!   json: false
//! ```

pub mod models;

pub use models::*;

use crate::utils::error::{LlmBatchError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub batch: BatchSettings,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LlmBatchError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml_str(&content)?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)
                .map_err(|e| LlmBatchError::Config(format!("Failed to parse config: {}", e)))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay every recognized environment variable onto this configuration
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())?;
        self.providers.apply_env();
        Ok(())
    }

    /// Overlay batch and logging settings from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("LLM_BATCH_SIZE") {
            self.batch.batch_size = parse_var("LLM_BATCH_SIZE", &value)?;
        }
        if let Some(value) = lookup("LLM_BATCH_WINDOW_MS") {
            self.batch.window_ms = parse_var("LLM_BATCH_WINDOW_MS", &value)?;
        }
        if let Some(value) = lookup("LLM_BATCH_LOG") {
            self.logging.level = value;
        }
        if let Some(value) = lookup("LLM_BATCH_LOG_JSON") {
            self.logging.json = matches!(value.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.batch.to_batch_config().validate()?;

        self.providers
            .openai
            .validate()
            .map_err(|e| LlmBatchError::Config(format!("OpenAI config error: {}", e)))?;
        self.providers
            .anthropic
            .validate()
            .map_err(|e| LlmBatchError::Config(format!("Anthropic config error: {}", e)))?;

        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| LlmBatchError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| LlmBatchError::Config(format!("{} has an invalid value: '{}'", name, value)))
}
