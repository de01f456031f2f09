//! Error handling for the batching client
//!
//! Provider failures are described by [`ProviderError`]; this module wraps
//! them together with configuration and I/O failures into one crate error.

#![allow(missing_docs)]

use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::ItemError;
use thiserror::Error;

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, LlmBatchError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum LlmBatchError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend name not present in the registry
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// One-shot provider call failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Batched request resolved with an error payload
    #[error("Request failed: {0}")]
    Item(ItemError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ItemError> for LlmBatchError {
    fn from(err: ItemError) -> Self {
        Self::Item(err)
    }
}

/// Helper functions for creating specific errors
impl LlmBatchError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn unsupported_provider<S: Into<String>>(name: S) -> Self {
        Self::UnsupportedProvider(name.into())
    }

    /// Whether the error was raised before any request was sent
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_) | Self::UnsupportedProvider(_))
    }
}
